use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use palette_core::notify::TwilioNotifier;
use palette_core::refresh::Refresher;
use palette_core::response::InvocationResponse;
use palette_core::submission::notify_submission;

use crate::error::AppError;
use crate::state::AppState;

type Invocation = (StatusCode, Json<InvocationResponse>);

/// The HTTP status mirrors `statusCode`; the body is the response itself.
fn invocation(response: InvocationResponse) -> Invocation {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

/// POST /functions/palette-refresh: run the whole pipeline once.
///
/// Clients are built per invocation inside the blocking worker, so missing
/// credentials surface as a 500 before any upstream call.
pub async fn palette_refresh(State(app): State<AppState>) -> Result<Invocation, AppError> {
    let response = tokio::task::spawn_blocking(move || {
        match Refresher::from_config(&app.config, &app.env) {
            Ok(refresher) => refresher.run().response(),
            Err(e) => {
                tracing::error!(error = %e, "palette refresh not configured");
                InvocationResponse::failure(&e.to_string(), None)
            }
        }
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(invocation(response))
}

/// POST /functions/submission-created: text the owner about a form
/// submission. The request body is accepted and ignored.
pub async fn submission_created(State(app): State<AppState>) -> Result<Invocation, AppError> {
    let response = tokio::task::spawn_blocking(move || {
        let notify = &app.config.notify;
        match TwilioNotifier::from_config(notify, &app.env) {
            Ok(notifier) => notify_submission(&notifier, &notify.submission_message),
            Err(e) => {
                tracing::error!(error = %e, "submission alert not configured");
                InvocationResponse::failure(&e.to_string(), Some("notify"))
            }
        }
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(invocation(response))
}
