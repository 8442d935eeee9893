use crate::error::{PaletteError, Result};
use serde::{Deserialize, Serialize};

/// Number of colour slots in a palette and in a colour-model result.
pub const PALETTE_SIZE: usize = 5;

/// Slot names in serialization order. Index `i` is filled from `result[i]`.
pub const SLOT_NAMES: [&str; PALETTE_SIZE] = [
    "lightShades",
    "lightAccent",
    "mainBrand",
    "darkAccent",
    "darkShades",
];

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// The site's five named colours. Values are opaque `r,g,b` strings, consumed
/// by the stylesheet as `rgb(<value>)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub light_shades: String,
    pub light_accent: String,
    pub main_brand: String,
    pub dark_accent: String,
    pub dark_shades: String,
}

impl Default for Palette {
    /// The palette the site shipped with before the first refresh.
    fn default() -> Self {
        Self {
            light_shades: "242, 242, 241".to_string(),
            light_accent: "139, 142, 149".to_string(),
            main_brand: "140, 100, 88".to_string(),
            dark_accent: "133, 129, 137".to_string(),
            dark_shades: "32, 30, 32".to_string(),
        }
    }
}

impl Palette {
    pub fn from_slots(values: [String; PALETTE_SIZE]) -> Self {
        let [light_shades, light_accent, main_brand, dark_accent, dark_shades] = values;
        Self {
            light_shades,
            light_accent,
            main_brand,
            dark_accent,
            dark_shades,
        }
    }

    /// `(slot name, value)` pairs in slot order.
    pub fn slots(&self) -> [(&'static str, &str); PALETTE_SIZE] {
        [
            (SLOT_NAMES[0], self.light_shades.as_str()),
            (SLOT_NAMES[1], self.light_accent.as_str()),
            (SLOT_NAMES[2], self.main_brand.as_str()),
            (SLOT_NAMES[3], self.dark_accent.as_str()),
            (SLOT_NAMES[4], self.dark_shades.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// ColorModelResponse
// ---------------------------------------------------------------------------

/// Raw colour-model payload: `{ "result": [[r, g, b], ...] }`.
///
/// Channels stay as the JSON numbers the upstream sent so nothing is rounded
/// or clamped on the way through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorModelResponse {
    pub result: Vec<Vec<serde_json::Number>>,
}

// ---------------------------------------------------------------------------
// transform
// ---------------------------------------------------------------------------

/// Map a colour-model result onto the named palette, light shades first.
pub fn transform(response: &ColorModelResponse) -> Result<Palette> {
    let colors: &[Vec<serde_json::Number>; PALETTE_SIZE] = response
        .result
        .as_slice()
        .try_into()
        .map_err(|_| PaletteError::InvalidPaletteSize(response.result.len()))?;

    Ok(Palette::from_slots(colors.each_ref().map(|c| join_channels(c))))
}

fn join_channels(channels: &[serde_json::Number]) -> String {
    channels
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
