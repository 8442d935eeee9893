use std::fmt;
use thiserror::Error;

/// The git operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStage {
    Connect,
    Clone,
    Stage,
    Commit,
    Push,
}

impl GitStage {
    pub fn as_str(self) -> &'static str {
        match self {
            GitStage::Connect => "connect",
            GitStage::Clone => "clone",
            GitStage::Stage => "stage",
            GitStage::Commit => "commit",
            GitStage::Push => "push",
        }
    }
}

impl fmt::Display for GitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("palette must have 5 colors, got {0}")]
    InvalidPaletteSize(usize),

    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("color API responded {status}: {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("git {stage} failed: {source}")]
    Git {
        stage: GitStage,
        #[source]
        source: git2::Error,
    },

    #[error("remote API responded {status}: {message}")]
    RemoteApi { status: u16, message: String },

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("invalid palette file: {0}")]
    InvalidPaletteFile(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PaletteError {
    pub(crate) fn git(stage: GitStage) -> impl FnOnce(git2::Error) -> Self {
        move |source| PaletteError::Git { stage, source }
    }

    pub(crate) fn missing(key: &str) -> Self {
        PaletteError::MissingConfig(key.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PaletteError>;
