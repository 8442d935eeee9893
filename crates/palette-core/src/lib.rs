pub mod color_api;
pub mod config;
pub mod env;
pub mod error;
pub mod file;
pub mod io;
pub mod notify;
pub mod palette;
pub mod probe;
pub mod refresh;
pub mod response;
pub mod submission;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use error::{PaletteError, Result};
