//! Flat `key=value` configuration reader.
//!
//! One entry per line. The key is everything before the first `=`, the value
//! everything after it, both trimmed. Lines without `=` are ignored; there
//! are no sections, quoting or comments.

use std::fs;
use std::path::Path;

use fuze_core::error::{FuzeError, Result};
use tracing::debug;

use crate::ENV_PREFIX;

const TRIMMED: &[char] = &[' ', '\t', '\r', '\n'];

/// Ordered `(key, value)` pairs in file order. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    entries: Vec<(String, String)>,
}

impl ConfigStore {
    /// Read and parse a config file. Fails only if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            FuzeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let store = Self::parse(&String::from_utf8_lossy(&bytes));
        debug!(path = %path.display(), entries = store.len(), "loaded config");
        Ok(store)
    }

    /// Parse config text. Malformed lines are skipped, never an error.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                (
                    key.trim_matches(TRIMMED).to_string(),
                    value.trim_matches(TRIMMED).to_string(),
                )
            })
            .collect();
        Self { entries }
    }

    /// First value stored under `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `env_NAME=value` entries as `(NAME, value)`, in file order.
    ///
    /// Keys that are exactly `env_` carry no variable name and are dropped.
    pub fn env_overlay(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name, value))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
