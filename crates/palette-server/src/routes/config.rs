use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config: the loaded `palette.yaml` settings, validation
/// warnings, and which credentials are present. Secret values never leave
/// the process.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let config = serde_json::to_value(&*app.config)?;
    Ok(Json(serde_json::json!({
        "config": config,
        "warnings": app.config.validate(),
        "credentials": app.env.presence(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette_core::config::Config;
    use palette_core::env::{self, Env};

    #[tokio::test]
    async fn reports_credentials_without_values() {
        let app = AppState::new(
            Config::default(),
            Env::from_pairs([(env::GITHUB_TOKEN, "super-secret")]),
        );
        let Json(json) = get_config(State(app)).await.unwrap();

        assert_eq!(json["config"]["writer"]["type"], "contents_api");
        assert_eq!(json["credentials"]["GITHUB_TOKEN"], true);
        assert_eq!(json["credentials"]["EMAIL"], false);
        assert!(!json.to_string().contains("super-secret"));
    }
}
