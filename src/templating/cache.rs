//! Compiled template cache.
//!
//! A compiled template is the text left after wrapper and include directives
//! have been resolved. It is remembered in memory and persisted next to its
//! source as `<source path><suffix>` (`view.htm` → `view.htmc`), readable and
//! writable by the owner only.
//!
//! Inside a Tokio runtime, artifacts are written in the background.
//! [`CompiledCache::wait_for_writes`] is the join point: it waits for every
//! pending write and reports the first failure as
//! [`StitchError::PersistFailed`]. Outside a runtime the write happens
//! immediately.
//!
//! # Cache Invalidation
//!
//! Artifacts never expire on their own. When templates change, remove them
//! with [`CompiledCache::purge`] or enable `verify_freshness`, which ignores
//! an artifact older than its source file. Only the compiled document's own
//! source is compared, not the files it includes.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::core::{Result, StitchError};
use crate::utils::fs::{find_files_with_suffix, is_older_than, write_private};

/// Memory and disk cache of compiled templates, keyed by source path.
pub struct CompiledCache {
    /// Source path → compiled text
    entries: DashMap<PathBuf, Arc<str>>,
    suffix: String,
    verify_freshness: bool,
    /// Background artifact writes not yet joined
    pending: Mutex<JoinSet<Result<()>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl std::fmt::Debug for CompiledCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledCache")
            .field("entries", &self.entries.len())
            .field("suffix", &self.suffix)
            .field("verify_freshness", &self.verify_freshness)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl CompiledCache {
    /// Create an empty cache naming artifacts with `suffix`.
    pub fn new(suffix: impl Into<String>, verify_freshness: bool) -> Self {
        Self {
            entries: DashMap::new(),
            suffix: suffix.into(),
            verify_freshness,
            pending: Mutex::new(JoinSet::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Path of the artifact for a source file.
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let mut path = source.as_os_str().to_owned();
        path.push(&self.suffix);
        PathBuf::from(path)
    }

    /// Look up a compiled template, first in memory and then on disk.
    ///
    /// An artifact found on disk is promoted into memory. Unreadable artifacts
    /// are treated as absent.
    pub async fn get(&self, source: &Path) -> Option<Arc<str>> {
        if let Some(text) = self.memory_hit(source) {
            return Some(text);
        }
        let artifact = self.readable_artifact(source)?;
        let read = tokio::fs::read_to_string(&artifact).await;
        self.promote(source, &artifact, read)
    }

    /// Blocking counterpart of [`CompiledCache::get`].
    pub fn get_blocking(&self, source: &Path) -> Option<Arc<str>> {
        if let Some(text) = self.memory_hit(source) {
            return Some(text);
        }
        let artifact = self.readable_artifact(source)?;
        let read = std::fs::read_to_string(&artifact);
        self.promote(source, &artifact, read)
    }

    fn memory_hit(&self, source: &Path) -> Option<Arc<str>> {
        let text = self.entries.get(source).map(|text| Arc::clone(&text))?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(text)
    }

    /// The artifact to read for `source`, or `None` when a fresh one cannot
    /// exist.
    fn readable_artifact(&self, source: &Path) -> Option<PathBuf> {
        let artifact = self.artifact_path(source);
        if self.verify_freshness && is_older_than(&artifact, source) {
            tracing::debug!("Ignoring stale artifact {}", artifact.display());
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(artifact)
    }

    fn promote(&self, source: &Path, artifact: &Path, read: std::io::Result<String>) -> Option<Arc<str>> {
        match read {
            Ok(text) => {
                tracing::debug!("Loaded compiled artifact {}", artifact.display());
                let text: Arc<str> = text.into();
                self.entries.insert(source.to_path_buf(), Arc::clone(&text));
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(text)
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("Cannot read artifact {}: {}", artifact.display(), e);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Remember a compiled template in memory only.
    pub fn insert(&self, source: &Path, text: Arc<str>) {
        self.entries.insert(source.to_path_buf(), text);
    }

    /// Remember a compiled template and persist its artifact.
    ///
    /// Within a Tokio runtime the write is scheduled in the background and
    /// its outcome is reported by [`CompiledCache::wait_for_writes`].
    /// Otherwise the artifact is written before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::PersistFailed`] when a write done immediately
    /// fails. A scheduled write always returns `Ok` here.
    pub fn store(&self, source: &Path, text: Arc<str>) -> Result<()> {
        self.insert(source, Arc::clone(&text));

        let artifact = self.artifact_path(source);
        let write = move || {
            write_private(&artifact, text.as_bytes()).map_err(|source| {
                tracing::error!("Failed to write {}: {}", artifact.display(), source);
                StitchError::PersistFailed {
                    path: artifact,
                    source,
                }
            })
        };

        match Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Scheduling artifact write for {}", source.display());
                self.pending().spawn_blocking_on(write, &handle);
                Ok(())
            }
            Err(_) => write(),
        }
    }

    fn pending(&self) -> MutexGuard<'_, JoinSet<Result<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for every scheduled artifact write.
    ///
    /// # Errors
    ///
    /// Returns the first [`StitchError::PersistFailed`] among the finished
    /// writes. All writes are joined even when one of them failed.
    pub async fn wait_for_writes(&self) -> Result<()> {
        let mut writes = std::mem::take(&mut *self.pending());
        let mut first_error = None;

        while let Some(joined) = writes.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(StitchError::PersistFailed {
                    path: PathBuf::from("<background write>"),
                    source: std::io::Error::other(e),
                })
            });
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Drop the in-memory entry for `source`. The artifact stays on disk.
    pub fn evict(&self, source: &Path) -> bool {
        self.entries.remove(source).is_some()
    }

    /// Drop every in-memory entry and reset the statistics.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Delete the artifacts below `roots` whose names end in
    /// `<extension><suffix>` and clear the memory cache.
    ///
    /// Returns the number of deleted files.
    ///
    /// # Errors
    ///
    /// Fails if a root cannot be walked or an artifact cannot be removed.
    pub async fn purge(&self, roots: &[PathBuf], extension: &str) -> Result<usize> {
        self.wait_for_writes().await?;
        self.clear();

        let suffix = format!("{extension}{}", self.suffix);
        let mut removed = 0;
        for root in roots {
            let walk_root = root.clone();
            let walk_suffix = suffix.clone();
            let artifacts = tokio::task::spawn_blocking(move || find_files_with_suffix(&walk_root, &walk_suffix))
                .await
                .map_err(|e| StitchError::from_read(root, std::io::Error::other(e)))?
                .map_err(|e| {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    StitchError::from_read(path, e.into())
                })?;

            for artifact in artifacts {
                tokio::fs::remove_file(&artifact)
                    .await
                    .map_err(|e| StitchError::from_read(&artifact, e))?;
                tracing::debug!("Removed {}", artifact.display());
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Number of compiled templates held in memory.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no compiled template is held in memory.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics as `(hits, misses)`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}
