use crate::error::{PaletteError, Result};
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;

// ---------------------------------------------------------------------------
// Environment keys
// ---------------------------------------------------------------------------

pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_USERNAME: &str = "GITHUB_USERNAME";
pub const EMAIL: &str = "EMAIL";
pub const REPOSITORY_URL: &str = "REPOSITORY_URL";
pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_TO_NUMBER: &str = "TWILIO_TO_NUMBER";
pub const TWILIO_FROM_NUMBER: &str = "TWILIO_FROM_NUMBER";

pub const KEYS: [&str; 8] = [
    GITHUB_TOKEN,
    GITHUB_USERNAME,
    EMAIL,
    REPOSITORY_URL,
    TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN,
    TWILIO_TO_NUMBER,
    TWILIO_FROM_NUMBER,
];

// ---------------------------------------------------------------------------
// Env
// ---------------------------------------------------------------------------

/// Snapshot of the environment variables a run reads its secrets from.
///
/// Captured once per invocation so collaborators never reach for
/// `std::env` themselves; tests build one from literal pairs.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Capture the process environment. Entries that are not valid UTF-8 are
    /// skipped rather than failing the whole snapshot.
    pub fn from_process() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    fn from_os_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self {
            vars: pairs
                .into_iter()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `key`, treating an empty string as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| PaletteError::missing(key))
    }

    /// Which of the known keys are set. Values are never exposed.
    pub fn presence(&self) -> BTreeMap<&'static str, bool> {
        KEYS.iter().map(|k| (*k, self.get(k).is_some())).collect()
    }
}
