use crate::color_api::{AnchorSlot, ColorModelRequest, DEFAULT_COLOR_API_URL, DEFAULT_MODEL};
use crate::error::{PaletteError, Result};
use crate::file::FileFormat;
use crate::palette::PALETTE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "palette.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ColorApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorApiConfig {
    #[serde(default = "default_color_api_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Optional 5-slot constraint; omitted means a free palette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Vec<AnchorSlot>>,
}

fn default_color_api_url() -> String {
    DEFAULT_COLOR_API_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ColorApiConfig {
    fn default() -> Self {
        Self {
            url: default_color_api_url(),
            model: default_model(),
            anchor: None,
        }
    }
}

impl ColorApiConfig {
    pub fn request(&self) -> ColorModelRequest {
        ColorModelRequest {
            input: self.anchor.clone(),
            model: self.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetConfig
// ---------------------------------------------------------------------------

/// Where the generated palette lands inside the site repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target_path")]
    pub path: String,
    #[serde(default)]
    pub format: FileFormat,
}

fn default_target_path() -> String {
    "palette.ts".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: default_target_path(),
            format: FileFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// WriterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriterConfig {
    /// Read the file's sha, then PUT new content through the contents API.
    ContentsApi {
        #[serde(default = "default_github_api")]
        api_base: String,
        owner: String,
        repo: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(default = "default_api_message")]
        message: String,
    },
    /// Shallow clone, commit and push with libgit2.
    Clone {
        /// Remote URL; falls back to `REPOSITORY_URL` when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default = "default_branch")]
        branch: String,
        #[serde(default = "default_depth")]
        depth: Option<u32>,
        #[serde(default = "default_author_name")]
        author_name: String,
        #[serde(default = "default_clone_message")]
        message: String,
    },
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_api_message() -> String {
    "Automated palette refresh".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_depth() -> Option<u32> {
    Some(10)
}

fn default_author_name() -> String {
    "Palette Bot".to_string()
}

fn default_clone_message() -> String {
    "Daily automatic palette cycle".to_string()
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig::ContentsApi {
            api_base: default_github_api(),
            owner: "gperl27".to_string(),
            repo: "website".to_string(),
            branch: None,
            message: default_api_message(),
        }
    }
}

impl WriterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            WriterConfig::ContentsApi { .. } => "contents_api",
            WriterConfig::Clone { .. } => "clone",
        }
    }
}

// ---------------------------------------------------------------------------
// NotifyConfig
// ---------------------------------------------------------------------------

/// When the refresh pipeline sends a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// After a successful write.
    #[default]
    OnSuccess,
    /// Only when the remote write fails.
    OnFailure,
    /// Both, with different messages.
    Always,
    Never,
}

impl NotifyPolicy {
    pub fn on_success(self) -> bool {
        matches!(self, NotifyPolicy::OnSuccess | NotifyPolicy::Always)
    }

    pub fn on_failure(self) -> bool {
        matches!(self, NotifyPolicy::OnFailure | NotifyPolicy::Always)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub policy: NotifyPolicy,
    #[serde(default = "default_sms_api")]
    pub api_base: String,
    #[serde(default = "default_success_message")]
    pub success_message: String,
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
    #[serde(default = "default_submission_message")]
    pub submission_message: String,
}

fn default_sms_api() -> String {
    "https://api.twilio.com".to_string()
}

fn default_success_message() -> String {
    "Palette refresh successful".to_string()
}

fn default_failure_message() -> String {
    "Palette refresh failed".to_string()
}

fn default_submission_message() -> String {
    "New form submission!".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            policy: NotifyPolicy::default(),
            api_base: default_sms_api(),
            success_message: default_success_message(),
            failure_message: default_failure_message(),
            submission_message: default_submission_message(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Non-secret settings, read from `palette.yaml`. Secrets come from [`crate::env::Env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub color_api: ColorApiConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            color_api: ColorApiConfig::default(),
            target: TargetConfig::default(),
            writer: WriterConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Fail with every error-level warning joined into one message. Warnings
    /// below error level do not block a run.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PaletteError::Config(errors.join("; ")))
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Endpoints must be absolute http(s) URLs
        let mut urls = vec![
            ("color_api.url", self.color_api.url.as_str()),
            ("notify.api_base", self.notify.api_base.as_str()),
        ];
        if let WriterConfig::ContentsApi { api_base, .. } = &self.writer {
            urls.push(("writer.api_base", api_base.as_str()));
        }
        for (field, url) in urls {
            match reqwest::Url::parse(url) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => push_error(
                    &mut warnings,
                    format!("{field} '{url}' is not an http(s) URL"),
                ),
            }
        }

        // 2. Colour model
        if self.color_api.model.trim().is_empty() {
            push_error(&mut warnings, "color_api.model is empty".to_string());
        }
        if let Some(anchor) = &self.color_api.anchor {
            if anchor.len() != PALETTE_SIZE {
                push_error(
                    &mut warnings,
                    format!(
                        "color_api.anchor has {} slots, expected {PALETTE_SIZE}",
                        anchor.len()
                    ),
                );
            }
        }

        // 3. Target path stays inside the repository
        let target = Path::new(&self.target.path);
        if self.target.path.trim().is_empty() || target.is_absolute() {
            push_error(
                &mut warnings,
                format!("target.path '{}' must be a relative path", self.target.path),
            );
        } else if target
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            push_error(
                &mut warnings,
                format!(
                    "target.path '{}' must not leave the repository",
                    self.target.path
                ),
            );
        }

        // 4. Writer
        match &self.writer {
            WriterConfig::ContentsApi {
                owner,
                repo,
                message,
                ..
            } => {
                if owner.trim().is_empty() || repo.trim().is_empty() {
                    push_error(
                        &mut warnings,
                        "writer.owner and writer.repo are required".to_string(),
                    );
                }
                if message.trim().is_empty() {
                    push_error(&mut warnings, "writer.message is empty".to_string());
                }
            }
            WriterConfig::Clone {
                branch,
                depth,
                message,
                ..
            } => {
                if branch.trim().is_empty() {
                    push_error(&mut warnings, "writer.branch is empty".to_string());
                }
                if message.trim().is_empty() {
                    push_error(&mut warnings, "writer.message is empty".to_string());
                }
                if *depth == Some(0) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: "writer.depth is 0, which clones the full history".to_string(),
                    });
                }
            }
        }

        // 5. Messages that will actually be sent
        let policy = self.notify.policy;
        if policy.on_success() && self.notify.success_message.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "notify.success_message is empty".to_string(),
            });
        }
        if policy.on_failure() && self.notify.failure_message.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "notify.failure_message is empty".to_string(),
            });
        }

        warnings
    }
}

fn push_error(warnings: &mut Vec<ConfigWarning>, message: String) {
    warnings.push(ConfigWarning {
        level: WarnLevel::Error,
        message,
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
