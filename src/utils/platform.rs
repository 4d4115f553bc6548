//! Platform helpers: path expansion and program location.

use std::path::PathBuf;

/// Expands `~` and environment variables in a configured path.
///
/// Supports `~/path`, `$VAR/path` and `${VAR}/path`. Undefined variables are
/// an error so that a typo in a root does not silently point somewhere else.
///
/// # Examples
///
/// ```rust,no_run
/// use stitch::utils::expand_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = expand_path("~/sites/blog/templates")?;
/// let theme = expand_path("$THEME_DIR/dark")?;
/// # Ok(())
/// # }
/// ```
pub fn expand_path(path: &str) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| anyhow::anyhow!("Failed to expand path '{path}': {e}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Directory containing the running executable, if it can be determined.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe().ok()?.parent().map(PathBuf::from)
}
