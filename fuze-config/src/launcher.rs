//! Typed launcher configuration.

use std::path::{Path, PathBuf};

use fuze_core::error::{FuzeError, Result};

use crate::store::ConfigStore;

pub const DEFAULT_UV_INSTALL_SCRIPT_WINDOWS: &str = "https://astral.sh/uv/install.ps1";
pub const DEFAULT_UV_INSTALL_SCRIPT_UNIX: &str = "https://astral.sh/uv/install.sh";

/// Launcher settings, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Application script, relative to the extracted `src` directory.
    pub entry: String,
    pub win_gui: bool,
    /// Working-directory anchor; relative paths hang off the executable dir.
    pub unzip_path: Option<PathBuf>,
    pub uv_install_script_windows: String,
    pub uv_install_script_unix: String,
    /// `env_*` overlay with the prefix stripped, in file order.
    pub env: Vec<(String, String)>,
}

impl LauncherConfig {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_store(&ConfigStore::load(path)?)
    }

    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let entry = required(store, "entry")?;
        if entry.is_empty() {
            return Err(FuzeError::Config("key 'entry' must not be empty".to_string()));
        }

        let win_gui = match required(store, "win_gui")? {
            "0" => false,
            "1" => true,
            other => {
                return Err(FuzeError::Config(format!(
                    "key 'win_gui' must be 0 or 1, got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            entry: entry.to_string(),
            win_gui,
            unzip_path: optional(store, "unzip_path").map(PathBuf::from),
            uv_install_script_windows: optional(store, "uv_install_script_windows")
                .unwrap_or(DEFAULT_UV_INSTALL_SCRIPT_WINDOWS)
                .to_string(),
            uv_install_script_unix: optional(store, "uv_install_script_unix")
                .unwrap_or(DEFAULT_UV_INSTALL_SCRIPT_UNIX)
                .to_string(),
            env: store
                .env_overlay()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    /// The directory the bundle is extracted into and provisioned from.
    pub fn working_dir(&self, executable_dir: &Path) -> PathBuf {
        match &self.unzip_path {
            Some(path) => executable_dir.join(path),
            None => executable_dir.to_path_buf(),
        }
    }
}

fn required<'a>(store: &'a ConfigStore, key: &str) -> Result<&'a str> {
    store
        .lookup(key)
        .ok_or_else(|| FuzeError::Config(format!("missing required key '{}'", key)))
}

fn optional<'a>(store: &'a ConfigStore, key: &str) -> Option<&'a str> {
    store.lookup(key).filter(|v| !v.is_empty())
}
