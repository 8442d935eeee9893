//! Read-only reachability check for the configured git remote.

use crate::config::{Config, WriterConfig};
use crate::env::{self, Env};
use crate::error::{GitStage, PaletteError, Result};
use crate::writer::token_callbacks;
use git2::{Direction, Remote};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRef {
    pub name: String,
    pub oid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteInfo {
    pub url: String,
    pub refs: Vec<RemoteRef>,
}

/// The repository URL a clone-based refresh would push to.
pub fn remote_url(config: &Config, env: &Env) -> Result<String> {
    if let WriterConfig::Clone { url: Some(url), .. } = &config.writer {
        if !url.trim().is_empty() {
            return Ok(url.clone());
        }
    }
    env.require(env::REPOSITORY_URL).map(str::to_string)
}

/// Connect to `url` and list its advertised refs without fetching anything.
pub fn probe_remote(url: &str, token: Option<&str>) -> Result<RemoteInfo> {
    let mut remote =
        Remote::create_detached(url).map_err(PaletteError::git(GitStage::Connect))?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(token_callbacks(token)), None)
        .map_err(PaletteError::git(GitStage::Connect))?;

    let refs = connection
        .list()
        .map_err(PaletteError::git(GitStage::Connect))?
        .iter()
        .map(|head| RemoteRef {
            name: head.name().to_string(),
            oid: head.oid().to_string(),
        })
        .collect();

    tracing::debug!(url, "remote reachable");
    Ok(RemoteInfo {
        url: url.to_string(),
        refs,
    })
}
