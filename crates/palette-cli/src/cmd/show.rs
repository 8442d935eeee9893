use crate::output::{print_json, print_palette};
use anyhow::Context;
use palette_core::file;
use std::path::Path;

pub fn run(path: &Path, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let palette = file::parse(&text).with_context(|| format!("in {}", path.display()))?;

    if json {
        print_json(&palette)?;
    } else {
        print_palette(&palette);
    }
    Ok(())
}
