//! Persisting a rendered palette to the site repository.
//!
//! One capability, [`RemoteContentWriter`], with interchangeable
//! implementations chosen by [`WriterConfig`]:
//!
//! - [`ContentsApiWriter`]: read the file's sha, PUT new content.
//! - [`CloneWriter`]: shallow clone, commit, push.
//! - [`LocalFileWriter`]: write into a local directory (dry runs).

mod clone;
mod contents;
mod local;

pub use clone::CloneWriter;
pub(crate) use clone::token_callbacks;
pub use contents::{ContentsApiWriter, RemoteFileState};
pub use local::LocalFileWriter;

use crate::config::{Config, WriterConfig};
use crate::env::Env;
use crate::error::{PaletteError, Result};
use crate::palette::Palette;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

pub trait RemoteContentWriter {
    /// Persist `palette` as one new revision of the target file.
    fn write(&self, palette: &Palette) -> Result<WriteReceipt>;

    /// Short human-readable description of the target, for logs.
    fn target(&self) -> String;
}

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteReceipt {
    pub writer: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub written_at: DateTime<Utc>,
}

impl WriteReceipt {
    pub(crate) fn new(writer: &str, path: &str, commit: Option<String>) -> Self {
        Self {
            writer: writer.to_string(),
            path: path.to_string(),
            commit,
            written_at: Utc::now(),
        }
    }
}

/// `path` as a repository-relative path, refusing anything that would land
/// outside the directory it is joined onto.
pub(crate) fn checked_target(path: &str) -> Result<&Path> {
    let target = Path::new(path);
    let inside = !path.trim().is_empty()
        && target
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if inside {
        Ok(target)
    } else {
        Err(PaletteError::Config(format!(
            "target path '{path}' must stay inside the repository"
        )))
    }
}

/// Build the writer the config selects. Credentials are resolved here, so a
/// missing value fails before any network call.
pub fn build(config: &Config, env: &Env) -> Result<Box<dyn RemoteContentWriter>> {
    let writer: Box<dyn RemoteContentWriter> = match &config.writer {
        WriterConfig::ContentsApi { .. } => Box::new(ContentsApiWriter::from_config(config, env)?),
        WriterConfig::Clone { .. } => Box::new(CloneWriter::from_config(config, env)?),
    };
    tracing::debug!(kind = config.writer.kind(), target = %writer.target(), "writer ready");
    Ok(writer)
}

/// Writer for `--dry-run`: the configured target path under `dir`.
pub fn dry_run(config: &Config, dir: impl Into<PathBuf>) -> Box<dyn RemoteContentWriter> {
    Box::new(LocalFileWriter::new(
        dir,
        &config.target.path,
        config.target.format,
    ))
}
