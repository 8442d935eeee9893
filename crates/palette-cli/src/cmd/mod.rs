pub mod config;
pub mod fetch;
pub mod notify;
pub mod refresh;
pub mod remote;
pub mod serve;
pub mod show;
pub mod submission;

use anyhow::Context;
use palette_core::config::Config;
use std::path::Path;

/// Load the resolved config file, or defaults when there is none.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Config::load_or_default(path).with_context(|| match path {
        Some(p) => format!("failed to load {}", p.display()),
        None => "failed to load default config".to_string(),
    })
}
