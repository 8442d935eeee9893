use axum::extract::State;
use axum::Json;
use palette_core::env;
use palette_core::probe::{self, RemoteInfo};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/remote: connect to the configured git remote and list its refs.
pub async fn check_remote(State(app): State<AppState>) -> Result<Json<RemoteInfo>, AppError> {
    let info = tokio::task::spawn_blocking(move || {
        let url = probe::remote_url(&app.config, &app.env)?;
        probe::probe_remote(&url, app.env.get(env::GITHUB_TOKEN))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(info))
}
