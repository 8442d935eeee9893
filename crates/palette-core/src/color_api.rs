//! Client for the colour-model API that generates fresh palettes.

use crate::error::{PaletteError, Result};
use crate::palette::ColorModelResponse;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_COLOR_API_URL: &str = "http://colormind.io/api/";
pub const DEFAULT_MODEL: &str = "default";

// ---------------------------------------------------------------------------
// AnchorSlot
// ---------------------------------------------------------------------------

/// One slot of the optional `input` constraint: either a fixed colour the
/// model must keep, or `"N"` to let the model choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSlot {
    Fixed([u8; 3]),
    Open,
}

const OPEN_SLOT: &str = "N";

impl Serialize for AnchorSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AnchorSlot::Fixed(rgb) => rgb.serialize(serializer),
            AnchorSlot::Open => serializer.serialize_str(OPEN_SLOT),
        }
    }
}

impl<'de> Deserialize<'de> for AnchorSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Rgb([u8; 3]),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Rgb(rgb) => Ok(AnchorSlot::Fixed(rgb)),
            Raw::Text(s) if s == OPEN_SLOT => Ok(AnchorSlot::Open),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "anchor slot must be [r, g, b] or \"{OPEN_SLOT}\", got \"{s}\""
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ColorModelRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<AnchorSlot>>,
    pub model: String,
}

impl Default for ColorModelRequest {
    fn default() -> Self {
        Self {
            input: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// PaletteSource
// ---------------------------------------------------------------------------

/// Anything that can produce a raw colour-model result.
pub trait PaletteSource {
    /// Request one new palette. A non-success HTTP status is reported as
    /// [`PaletteError::Upstream`] carrying the status and its reason phrase.
    fn fetch(&self, request: &ColorModelRequest) -> Result<ColorModelResponse>;
}

/// [`PaletteSource`] backed by the colormind HTTP API.
pub struct ColormindClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl ColormindClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            url: url.into(),
        }
    }
}

impl PaletteSource for ColormindClient {
    fn fetch(&self, request: &ColorModelRequest) -> Result<ColorModelResponse> {
        tracing::debug!(url = %self.url, model = %request.model, "posting color model request");

        let response = self.http.post(&self.url).json(request).send()?;
        let status = response.status();
        if !status.is_success() {
            let status_text = match status.canonical_reason() {
                Some(reason) => reason.to_string(),
                None => {
                    let body = response.text().unwrap_or_default();
                    match body.trim() {
                        "" => status.as_str().to_string(),
                        text => text.to_string(),
                    }
                }
            };
            tracing::warn!(status = status.as_u16(), %status_text, "unexpected color API response");
            return Err(PaletteError::Upstream {
                status: status.as_u16(),
                status_text,
            });
        }

        Ok(response.json()?)
    }
}
