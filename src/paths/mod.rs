//! Template search roots and name resolution.
//!
//! A template set is configured with one or more root directories. They are
//! located once, when the set is constructed, and never change afterwards:
//!
//! - an absolute root must be an existing directory;
//! - a relative root is tried next to the running executable first, then
//!   relative to the current working directory. The first existing directory
//!   wins.
//!
//! Template names are then resolved against the located roots in order. A
//! theme can override individual templates by being listed before the base
//! root:
//!
//! ```rust,no_run
//! use stitch::paths::SearchRoots;
//!
//! # fn example() -> stitch::core::Result<()> {
//! let roots = SearchRoots::locate(&["./templates/dark", "./templates"])?;
//! // templates/dark/view.htm if it exists, otherwise templates/view.htm
//! let path = roots.resolve("view", ".htm");
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use crate::core::{Result, StitchError};
use crate::utils::{dir_exists, executable_dir, file_is_readable};

/// Ordered, immutable list of located template root directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots {
    roots: Vec<PathBuf>,
}

impl SearchRoots {
    /// Locate every configured root.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::RootNotFound`] for the first root that is not an
    /// existing directory under either lookup strategy. For relative roots the
    /// reported path is the one tried relative to the working directory.
    pub fn locate<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        let exe_dir = executable_dir();
        let located = roots
            .iter()
            .map(|root| locate_root(root.as_ref(), exe_dir.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            roots: located,
        })
    }

    /// The located roots, in search order.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Iterate over the located roots in search order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.roots.iter()
    }

    /// Resolve a logical template name to a concrete path.
    ///
    /// `ext` is appended when the name does not already end with it. A name
    /// that already starts with a root is not prefixed again. The first
    /// candidate that is a readable regular file is returned.
    ///
    /// When no root contains the file, the candidate under the first root is
    /// returned anyway; reading it reports which file was missing.
    pub fn resolve(&self, name: &str, ext: &str) -> PathBuf {
        let name = with_extension(name, ext);
        let name_path = Path::new(&name);

        let mut fallback = None;
        for root in &self.roots {
            let candidate = if name_path.starts_with(root) {
                name_path.to_path_buf()
            } else {
                root.join(name_path)
            };

            if file_is_readable(&candidate) {
                tracing::trace!("Resolved '{}' to {}", name, candidate.display());
                return candidate;
            }
            fallback.get_or_insert(candidate);
        }

        tracing::debug!("Template '{}' not found under any root", name);
        fallback.unwrap_or_else(|| name_path.to_path_buf())
    }
}

impl<'a> IntoIterator for &'a SearchRoots {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

fn with_extension(name: &str, ext: &str) -> String {
    if name.ends_with(ext) {
        name.to_string()
    } else {
        format!("{name}{ext}")
    }
}

fn locate_root(root: &Path, exe_dir: Option<&Path>) -> Result<PathBuf> {
    if root.is_absolute() {
        if dir_exists(root) {
            tracing::debug!("Using template root {}", root.display());
            return Ok(root.to_path_buf());
        }
        return Err(StitchError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    if let Some(exe_dir) = exe_dir {
        let by_exe = exe_dir.join(root);
        if dir_exists(&by_exe) {
            tracing::debug!("Using template root {} (next to executable)", by_exe.display());
            return Ok(by_exe);
        }
    }

    let by_cwd = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    if dir_exists(&by_cwd) {
        tracing::debug!("Using template root {} (working directory)", by_cwd.display());
        return Ok(by_cwd);
    }

    Err(StitchError::RootNotFound {
        path: by_cwd,
    })
}
