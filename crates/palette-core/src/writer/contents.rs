use super::{RemoteContentWriter, WriteReceipt};
use crate::config::{Config, WriterConfig};
use crate::env::{self, Env};
use crate::error::{PaletteError, Result};
use crate::file::{self, FileFormat};
use crate::palette::Palette;
use base64::Engine as _;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Revision token of the file currently on the remote. `sha` is `None` when
/// the file does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileState {
    pub sha: Option<String>,
}

#[derive(Deserialize)]
struct ContentsEntry {
    sha: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutResponse {
    #[serde(default)]
    commit: Option<CommitRef>,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

/// Writes through a hosting provider's "get / update file contents" REST calls.
///
/// Staleness is left to the remote: the sha read here is sent back with the
/// update and a mismatch comes back as a non-success status.
pub struct ContentsApiWriter {
    http: Client,
    url: String,
    token: String,
    user_agent: String,
    branch: Option<String>,
    message: String,
    path: String,
    format: FileFormat,
}

impl ContentsApiWriter {
    pub fn from_config(config: &Config, env: &Env) -> Result<Self> {
        let WriterConfig::ContentsApi {
            api_base,
            owner,
            repo,
            branch,
            message,
        } = &config.writer
        else {
            return Err(PaletteError::Config(format!(
                "writer type is '{}', not contents_api",
                config.writer.kind()
            )));
        };

        let token = env.require(env::GITHUB_TOKEN)?.to_string();
        let user_agent = env.require(env::GITHUB_USERNAME)?.to_string();
        let url = format!(
            "{}/repos/{owner}/{repo}/contents/{}",
            api_base.trim_end_matches('/'),
            config.target.path.trim_start_matches('/'),
        );

        Ok(Self {
            http: Client::new(),
            url,
            token,
            user_agent,
            branch: branch.clone(),
            message: message.clone(),
            path: config.target.path.clone(),
            format: config.target.format,
        })
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    /// Read the current revision token of the target file.
    pub fn read_state(&self) -> Result<RemoteFileState> {
        let mut req = self.authorized(self.http.get(&self.url));
        if let Some(branch) = &self.branch {
            req = req.query(&[("ref", branch)]);
        }
        let response = req.send()?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(url = %self.url, "target file does not exist yet");
            return Ok(RemoteFileState { sha: None });
        }
        let entry: ContentsEntry = success(response)?.json()?;
        Ok(RemoteFileState {
            sha: Some(entry.sha),
        })
    }
}

impl RemoteContentWriter for ContentsApiWriter {
    fn write(&self, palette: &Palette) -> Result<WriteReceipt> {
        let state = self.read_state()?;
        tracing::debug!(sha = ?state.sha, "read remote file state");

        let contents = file::render(palette, self.format)?;
        let body = PutContents {
            message: &self.message,
            content: base64::engine::general_purpose::STANDARD.encode(contents),
            sha: state.sha.as_deref(),
            branch: self.branch.as_deref(),
        };
        let response = self.authorized(self.http.put(&self.url)).json(&body).send()?;
        let put: PutResponse = success(response)?.json()?;

        let commit = put.commit.map(|c| c.sha);
        tracing::info!(url = %self.url, commit = ?commit, "file written successfully to remote");
        Ok(WriteReceipt::new("contents_api", &self.path, commit))
    }

    fn target(&self) -> String {
        match &self.branch {
            Some(b) => format!("{} ({b})", self.url),
            None => self.url.clone(),
        }
    }
}

/// Pass a success response through; turn anything else into `RemoteApi`,
/// preferring the API's own `message` field.
fn success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ApiMessage {
        message: String,
    }

    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&text)
        .map(|m| m.message)
        .ok()
        .filter(|m| !m.is_empty())
        .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

    Err(PaletteError::RemoteApi {
        status: status.as_u16(),
        message,
    })
}
