//! Recursive file discovery under template roots.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds every regular file below `dir` whose name ends with `suffix`.
///
/// Symlinks are followed so that themes linked into a root are visited.
/// Entries that cannot be read while walking are returned as errors rather
/// than skipped; a root with an unreadable subdirectory is a configuration
/// problem worth reporting.
///
/// # Errors
///
/// Returns the first [`walkdir::Error`] encountered.
pub fn find_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
