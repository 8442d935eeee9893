use super::{RemoteContentWriter, WriteReceipt};
use crate::error::Result;
use crate::file::{self, FileFormat};
use crate::palette::Palette;
use std::path::PathBuf;

/// Writes the palette file into a local directory instead of a remote.
pub struct LocalFileWriter {
    dir: PathBuf,
    path: String,
    format: FileFormat,
}

impl LocalFileWriter {
    pub fn new(dir: impl Into<PathBuf>, path: &str, format: FileFormat) -> Self {
        Self {
            dir: dir.into(),
            path: path.to_string(),
            format,
        }
    }
}

impl RemoteContentWriter for LocalFileWriter {
    fn write(&self, palette: &Palette) -> Result<WriteReceipt> {
        let dest = self.dir.join(super::checked_target(&self.path)?);
        let contents = file::render(palette, self.format)?;
        crate::io::atomic_write(&dest, contents.as_bytes())?;
        tracing::info!(path = %dest.display(), "palette written locally");
        Ok(WriteReceipt::new("local", &self.path, None))
    }

    fn target(&self) -> String {
        self.dir.join(&self.path).display().to_string()
    }
}
