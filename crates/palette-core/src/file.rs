//! Rendering and parsing of the generated palette file committed to the site
//! repository.

use crate::error::{PaletteError, Result};
use crate::palette::{Palette, PALETTE_SIZE, SLOT_NAMES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// On-disk shape of the palette file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// `export const palette = {...}`: imported directly by the theme.
    #[default]
    TsModule,
    /// `{"palette": {...}}`
    Json,
}

#[derive(Serialize, Deserialize)]
struct PaletteDocument {
    palette: Palette,
}

const TS_PREFIX: &str = "export const palette = ";

pub fn render(palette: &Palette, format: FileFormat) -> Result<String> {
    let text = match format {
        FileFormat::TsModule => format!("{TS_PREFIX}{}\n", serde_json::to_string(palette)?),
        FileFormat::Json => {
            let doc = PaletteDocument {
                palette: palette.clone(),
            };
            format!("{}\n", serde_json::to_string(&doc)?)
        }
    };
    Ok(text)
}

/// Parse any palette file the site has carried: both generated formats and the
/// hand-written TypeScript literal with unquoted keys.
pub fn parse(text: &str) -> Result<Palette> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        if let Ok(doc) = serde_json::from_str::<PaletteDocument>(trimmed) {
            return Ok(doc.palette);
        }
    }

    let object = object_literal(trimmed)
        .ok_or_else(|| PaletteError::InvalidPaletteFile("no object literal found".into()))?;
    if let Ok(palette) = serde_json::from_str::<Palette>(object) {
        return Ok(palette);
    }
    parse_literal(object)
}

/// The `{ ... }` span of the palette declaration.
fn object_literal(text: &str) -> Option<&str> {
    let from = text.find("const palette").unwrap_or(0);
    let start = from + text[from..].find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn entry_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']?([A-Za-z_]\w*)["']?\s*:\s*"([^"]*)""#).unwrap())
}

fn parse_literal(object: &str) -> Result<Palette> {
    let entries: HashMap<&str, &str> = entry_pattern()
        .captures_iter(object)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect();

    let mut values: [String; PALETTE_SIZE] = Default::default();
    for (slot, name) in values.iter_mut().zip(SLOT_NAMES) {
        *slot = entries
            .get(name)
            .ok_or_else(|| PaletteError::InvalidPaletteFile(format!("missing slot '{name}'")))?
            .to_string();
    }
    Ok(Palette::from_slots(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Palette {
        Palette::from_slots([
            "1,2,3".into(),
            "4,5,6".into(),
            "7,8,9".into(),
            "10,11,12".into(),
            "13,14,15".into(),
        ])
    }

    #[test]
    fn ts_module_round_trips() {
        let text = render(&sample(), FileFormat::TsModule).unwrap();
        assert!(text.starts_with("export const palette = {\"lightShades\":\"1,2,3\""));
        assert_eq!(parse(&text).unwrap(), sample());
    }

    #[test]
    fn json_round_trips() {
        let text = render(&sample(), FileFormat::Json).unwrap();
        assert!(text.starts_with("{\"palette\":{"));
        assert_eq!(parse(&text).unwrap(), sample());
    }

    #[test]
    fn parses_hand_written_literal() {
        let text = r#"import { Palette } from "./src/utils/theme"

export const palette: Palette = {
  darkAccent: "133, 129, 137",
  darkShades: "32, 30, 32",
  lightAccent: "139, 142, 149",
  lightShades: "242, 242, 241",
  mainBrand: "140, 100, 88",
}
"#;
        assert_eq!(parse(text).unwrap(), Palette::default());
    }

    #[test]
    fn missing_slot_is_an_error() {
        let text = r#"export const palette = { lightShades: "1,2,3" }"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("lightAccent"));
    }

    #[test]
    fn text_without_object_is_an_error() {
        assert!(matches!(
            parse("export const palette = null"),
            Err(PaletteError::InvalidPaletteFile(_))
        ));
    }

    #[test]
    fn file_format_yaml_is_snake_case() {
        let yaml = serde_yaml::to_string(&FileFormat::TsModule).unwrap();
        assert_eq!(yaml.trim(), "ts_module");
    }
}
