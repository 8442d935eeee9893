use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use palette_core::PaletteError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Errors outside the invocation contract (join failures, config views).
/// Pipeline failures never reach here; they are `InvocationResponse`s.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<PaletteError>() {
            Some(PaletteError::MissingConfig(_) | PaletteError::Config(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Some(PaletteError::InvalidPaletteSize(_) | PaletteError::InvalidPaletteFile(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Some(
                PaletteError::Upstream { .. }
                | PaletteError::RemoteApi { .. }
                | PaletteError::Git { .. }
                | PaletteError::Notify(_)
                | PaletteError::Http(_),
            ) => StatusCode::BAD_GATEWAY,
            Some(PaletteError::Io(_) | PaletteError::Yaml(_) | PaletteError::Json(_)) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
