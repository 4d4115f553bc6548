//! Atomic file writes using a temp-and-rename strategy.

use std::io::Write;
use std::path::Path;

/// Atomically writes bytes to a file readable and writable only by its owner.
///
/// The content goes to a temporary file in the destination directory first,
/// is synced to disk, and is then renamed over the target. Readers never see
/// a partially written artifact. On Unix the temporary file is created with
/// mode `0600`, which the rename carries over.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory is not writable, the
/// disk is full, or the rename fails.
///
/// # Examples
///
/// ```rust,no_run
/// use stitch::utils::fs::write_private;
/// use std::path::Path;
///
/// # fn example() -> std::io::Result<()> {
/// write_private(Path::new("templates/view.htmc"), b"<html>${title}</html>")?;
/// # Ok(())
/// # }
/// ```
pub fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep permissions explicit even if the temp file defaults ever change
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file().set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
