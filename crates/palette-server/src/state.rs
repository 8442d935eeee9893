use palette_core::config::Config;
use palette_core::env::Env;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// Read-only: every invocation builds its own clients from these.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub env: Arc<Env>,
}

impl AppState {
    pub fn new(config: Config, env: Env) -> Self {
        Self {
            config: Arc::new(config),
            env: Arc::new(env),
        }
    }
}
