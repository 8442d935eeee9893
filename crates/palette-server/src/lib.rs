pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use palette_core::config::Config;
use palette_core::env::Env;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all function and API routes.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Functions
        .route(
            "/functions/palette-refresh",
            post(routes::functions::palette_refresh),
        )
        .route(
            "/functions/submission-created",
            post(routes::functions::submission_created),
        )
        // API
        .route("/api/config", get(routes::config::get_config))
        .route("/api/remote", get(routes::remote::check_remote))
        .route("/api/health", get(routes::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the function host on `port`.
pub async fn serve(config: Config, env: Env, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(config, env, listener).await
}

/// Start the function host on a pre-bound listener, so the caller can read
/// the actual port when `port = 0`.
pub async fn serve_on(
    config: Config,
    env: Env,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state::AppState::new(config, env));

    tracing::info!("palette function host listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
