use super::load_config;
use crate::output::{print_json, print_palette};
use palette_core::color_api::{ColormindClient, PaletteSource};
use palette_core::palette::transform;
use std::path::Path;

/// Fetch and transform one palette; nothing is written or sent.
pub fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let source = ColormindClient::new(config.color_api.url.clone());
    let response = source.fetch(&config.color_api.request())?;
    let palette = transform(&response)?;

    if json {
        print_json(&palette)?;
    } else {
        print_palette(&palette);
    }
    Ok(())
}
