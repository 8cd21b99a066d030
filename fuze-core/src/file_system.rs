//! Filesystem helpers used while unpacking the bundle and probing the
//! working directory.
//!
//! Every failure carries the offending path. Callers treat these errors as
//! fatal: a half-populated working directory is never repaired in place.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{FuzeError, Result};

/// True if the path resolves, following symlinks.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Create `path` and all of its missing ancestors.
///
/// An already existing directory is success.
pub fn recursive_mkdir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(FuzeError::filesystem(path, e)),
    }
}

/// Copy a single regular file byte for byte, preserving its permission bits.
///
/// The destination is truncated if it already exists.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        recursive_mkdir(parent)?;
    }
    trace!(src = %src.display(), dst = %dst.display(), "copy file");
    fs::copy(src, dst).map_err(|e| FuzeError::filesystem(src, e))?;
    Ok(())
}

/// Mirror the tree under `src_dir` into `dst_dir`.
///
/// Directories are created as needed and regular files are copied with
/// [`copy_file`]. Symlinks are followed, so a link to a file lands as a
/// regular file. Anything that is neither a file nor a directory is skipped.
pub fn recursive_copy(src_dir: &Path, dst_dir: &Path) -> Result<()> {
    let meta = fs::metadata(src_dir).map_err(|e| FuzeError::filesystem(src_dir, e))?;
    if !meta.is_dir() {
        return Err(FuzeError::filesystem(
            src_dir,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    recursive_mkdir(dst_dir)?;

    for entry in WalkDir::new(src_dir).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            FuzeError::filesystem(path, io::Error::other(e.to_string()))
        })?;
        let relative = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|e| FuzeError::Internal(format!("walk escaped source root: {}", e)))?;
        let target = dst_dir.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            recursive_mkdir(&target)?;
        } else if file_type.is_file() {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Copy `src` to `dst`, recursing when `src` is a directory.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| FuzeError::filesystem(src, e))?;
    if meta.is_dir() {
        recursive_copy(src, dst)
    } else if meta.is_file() {
        copy_file(src, dst)
    } else {
        Ok(())
    }
}

/// Directory containing the running executable.
///
/// All relative launcher paths are anchored here so behavior does not depend
/// on the caller's working directory.
pub fn executable_directory() -> Result<PathBuf> {
    let exe = env::current_exe().map_err(|e| FuzeError::filesystem("<current executable>", e))?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        FuzeError::Internal(format!("executable path {} has no parent", exe.display()))
    })
}
