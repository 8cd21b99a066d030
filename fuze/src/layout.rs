//! Well-known locations inside the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use fuze_core::error::{FuzeError, Result};

pub const UV_DIR: &str = "uv";
pub const UV_BINARY: &str = "uv";
pub const PYTHON_DIR: &str = "python";
pub const CACHE_DIR: &str = "cache";
pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const LOCK_FILE: &str = "uv.lock";
pub const VENV_MARKER: &str = ".venv/pyvenv.cfg";
pub const SOURCE_DIR: &str = "src";

/// Absolute paths derived from the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    pub root: PathBuf,
    pub uv_dir: PathBuf,
    pub uv_binary: PathBuf,
    pub python_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub manifest: PathBuf,
    pub requirements: PathBuf,
    pub lock_file: PathBuf,
    pub venv_marker: PathBuf,
    pub src_dir: PathBuf,
}

impl RuntimeLayout {
    /// `uv_file_name` is the package manager binary name for the running
    /// platform (`uv` or `uv.exe`).
    pub fn new(root: &Path, uv_file_name: &str) -> Self {
        let uv_dir = root.join(UV_DIR);
        Self {
            root: root.to_path_buf(),
            uv_binary: uv_dir.join(uv_file_name),
            uv_dir,
            python_dir: root.join(PYTHON_DIR),
            cache_dir: root.join(CACHE_DIR),
            manifest: root.join(MANIFEST_FILE),
            requirements: root.join(REQUIREMENTS_FILE),
            lock_file: root.join(LOCK_FILE),
            venv_marker: root.join(VENV_MARKER),
            src_dir: root.join(SOURCE_DIR),
        }
    }

    /// The installed interpreter directory, if any.
    ///
    /// The first non-hidden child of `python/` in name order wins. A missing
    /// `python/` directory means nothing is installed yet.
    pub fn find_python(&self) -> Result<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.python_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FuzeError::filesystem(&self.python_dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FuzeError::filesystem(&self.python_dir, e))?;
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with('.') {
                names.push(name);
            }
        }
        names.sort();

        Ok(names.into_iter().next().map(|name| self.python_dir.join(name)))
    }
}
