//! Asset synchronization from the read-only bundle into the working directory.
//!
//! The bundled build id decides between a full overwrite and a
//! copy-if-missing pass. The local id is written only after every entry has
//! been copied, so an interrupted extraction is redone in full next time.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use fuze_config::CONFIG_FILE_NAME;
use fuze_core::error::{FuzeError, Result};
use fuze_core::file_system;
use fuze_core::msg_format;
use fuze_messages::MESSAGES;
use fuze_platform::PlatformProvider;
use tracing::{debug, info};

use crate::report;

pub const BUILD_ID_FILE: &str = ".build_id.txt";

/// Internal metadata marker written by the bundler.
pub const METADATA_MARKER: &str = ".fuze";

pub const MAX_BUILD_ID_LEN: usize = 128;

/// Top-level bundle entries that are never extracted.
pub const RESERVED_ENTRIES: [&str; 3] = [METADATA_MARKER, CONFIG_FILE_NAME, BUILD_ID_FILE];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub changed: bool,
    /// Entry names copied into the working directory.
    pub extracted: Vec<String>,
    /// Entry names left alone because they already existed.
    pub kept: Vec<String>,
}

/// Read a build id, truncated to [`MAX_BUILD_ID_LEN`] bytes.
///
/// `Ok(None)` when the file does not exist.
pub fn read_build_id(path: &Path) -> Result<Option<String>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FuzeError::filesystem(path, e)),
    };
    let mut bytes = Vec::with_capacity(MAX_BUILD_ID_LEN);
    file.take(MAX_BUILD_ID_LEN as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| FuzeError::filesystem(path, e))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Extract `bundle_root` into `workdir`.
pub fn synchronize(
    bundle_root: &Path,
    workdir: &Path,
    platform: &mut dyn PlatformProvider,
) -> Result<SyncReport> {
    let bundled_id = read_build_id(&bundle_root.join(BUILD_ID_FILE))?.unwrap_or_default();
    let local_path = workdir.join(BUILD_ID_FILE);
    let local_id = read_build_id(&local_path)?;

    let changed = local_id.as_deref() != Some(bundled_id.as_str());
    debug!(bundled = %bundled_id, local = ?local_id, changed, "comparing build ids");
    if changed {
        report::progress(platform, MESSAGES.sync.build_id_changed)?;
    }

    let mut report = SyncReport {
        changed,
        ..SyncReport::default()
    };

    for (name, src) in bundle_entries(bundle_root)? {
        let dst = workdir.join(&name);
        if !changed && file_system::exists(&dst) {
            report.kept.push(name);
            continue;
        }

        let template = if src.is_dir() {
            MESSAGES.sync.extracting_dir
        } else {
            MESSAGES.sync.extracting_file
        };
        report::progress(platform, &msg_format!(template, path = src.display()))?;

        if changed {
            clear_mismatched(&src, &dst)?;
        }
        file_system::copy_entry(&src, &dst)?;
        report.extracted.push(name);
    }

    if changed {
        fs::write(&local_path, bundled_id.as_bytes())
            .map_err(|e| FuzeError::filesystem(&local_path, e))?;
        info!(build_id = %bundled_id, "build id persisted");
        report::success(
            platform,
            &msg_format!(MESSAGES.sync.build_id_updated, file = local_path.display()),
        )?;
    }

    Ok(report)
}

/// Non-reserved top-level entries of the bundle, sorted by name.
fn bundle_entries(bundle_root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let read_dir = fs::read_dir(bundle_root).map_err(|e| FuzeError::filesystem(bundle_root, e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| FuzeError::filesystem(bundle_root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if RESERVED_ENTRIES.contains(&name.as_str()) {
            continue;
        }
        entries.push((name, entry.path()));
    }
    entries.sort();
    Ok(entries)
}

/// Remove `dst` when it is a file where `src` is a directory, or the reverse.
fn clear_mismatched(src: &Path, dst: &Path) -> Result<()> {
    let Ok(dst_meta) = fs::metadata(dst) else {
        return Ok(());
    };
    let src_is_dir = src.is_dir();
    let removal = if dst_meta.is_dir() && !src_is_dir {
        fs::remove_dir_all(dst)
    } else if !dst_meta.is_dir() && src_is_dir {
        fs::remove_file(dst)
    } else {
        return Ok(());
    };
    removal.map_err(|e| FuzeError::filesystem(dst, e))
}
