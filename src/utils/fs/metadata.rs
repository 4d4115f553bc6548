//! Metadata checks on template sources and artifacts.

use std::fs;
use std::path::Path;

/// Checks whether `path` is an existing directory.
pub fn dir_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Checks whether `path` is a regular file that can be opened for reading.
///
/// Opening the file (rather than inspecting permission bits) gives the right
/// answer under ACLs and for the superuser.
pub fn file_is_readable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => fs::File::open(path).is_ok(),
        _ => false,
    }
}

/// Returns `true` if `path` was modified before `other`.
///
/// Missing files or file systems without modification times yield `false`.
pub fn is_older_than(path: &Path, other: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(path), modified(other)) {
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}
