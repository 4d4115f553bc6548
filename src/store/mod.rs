//! Raw template source cache.
//!
//! [`FileStore`] reads template files and remembers their content by path for
//! the lifetime of the process. It never searches roots itself: callers hand it
//! the concrete path produced by [`SearchRoots::resolve`](crate::paths::SearchRoots::resolve).
//!
//! An empty cached entry counts as a miss, so a file that was read while still
//! empty is read again on the next request.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{Result, StitchError};
use crate::utils::fs::find_files_with_suffix;

/// Concurrent path → content cache for template sources.
#[derive(Debug, Default)]
pub struct FileStore {
    files: DashMap<PathBuf, Arc<str>>,
}

impl FileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::NotFound`] if the file does not exist and
    /// [`StitchError::Read`] for any other read failure (permissions, invalid
    /// UTF-8). Both name the path.
    pub async fn load(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.cached(path) {
            return Ok(text);
        }

        let text = tokio::fs::read_to_string(path).await.map_err(|e| StitchError::from_read(path, e))?;
        Ok(self.remember(path, text))
    }

    /// Blocking counterpart of [`FileStore::load`], for callers that cannot
    /// await, such as producers running during a render.
    ///
    /// # Errors
    ///
    /// Same as [`FileStore::load`].
    pub fn load_blocking(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.cached(path) {
            return Ok(text);
        }

        let text = std::fs::read_to_string(path).map_err(|e| StitchError::from_read(path, e))?;
        Ok(self.remember(path, text))
    }

    fn remember(&self, path: &Path, text: String) -> Arc<str> {
        let text: Arc<str> = text.into();
        tracing::debug!("Loaded {} ({} bytes)", path.display(), text.len());
        self.files.insert(path.to_path_buf(), Arc::clone(&text));
        text
    }

    fn cached(&self, path: &Path) -> Option<Arc<str>> {
        self.files.get(path).filter(|text| !text.is_empty()).map(|text| Arc::clone(&text))
    }

    /// Load every file ending with `ext` below each root.
    ///
    /// # Errors
    ///
    /// Fails on the first directory that cannot be walked or file that cannot
    /// be read.
    pub async fn preload(&self, roots: &[PathBuf], ext: &str) -> Result<usize> {
        let mut count = 0;
        for root in roots {
            let walk_root = root.clone();
            let suffix = ext.to_string();
            let files = tokio::task::spawn_blocking(move || find_files_with_suffix(&walk_root, &suffix))
                .await
                .map_err(|e| StitchError::from_read(root, std::io::Error::other(e)))?
                .map_err(|e| {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    StitchError::from_read(path, e.into())
                })?;

            for file in files {
                self.load(&file).await?;
                count += 1;
            }
        }

        tracing::debug!("Preloaded {} template(s)", count);
        Ok(count)
    }

    /// Whether a non-empty entry for `path` is cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.cached(path).is_some()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop the entry for `path`, forcing the next load to hit the disk.
    pub fn evict(&self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.files.clear();
    }
}
