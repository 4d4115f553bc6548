//! Template composition and rendering.
//!
//! [`Templates`] ties the pipeline together. A request for a logical name
//! resolves it against the search roots and consults the compiled cache. On a
//! miss it loads the raw source, flattens wrapper and include directives, and
//! stores the result. It then renders the flattened text with the caller's
//! [`Stash`] and waits for the background artifact write.
//!
//! # Directives
//!
//! - `${wrapper layouts/main}` wraps the file into another template, whose
//!   `${content}` placeholder receives the wrapped text.
//! - `${include partials/header}` splices in another file, recursively,
//!   up to the configured include limit.
//!
//! # Example
//!
//! ```rust,no_run
//! use stitch::config::TemplatesConfig;
//! use stitch::templating::{Stash, Templates};
//!
//! # async fn example() -> stitch::core::Result<()> {
//! let templates = Templates::new(TemplatesConfig::new("./templates")).await?;
//!
//! let mut stash = Stash::new();
//! stash.insert("title", "Hello");
//!
//! let mut out = Vec::new();
//! templates.execute(&mut out, "view", &mut stash).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Submodules
//!
//! - [`stash`] - substitution values, including render-time producers
//! - [`substitute`] - the placeholder substitution engine
//! - [`directives`] - wrapper and include resolution
//! - [`cache`] - compiled template cache with on-disk artifacts
//! - [`renderer`] - strict final rendering

pub mod cache;
pub mod directives;
pub mod renderer;
pub mod stash;
pub mod substitute;

pub use cache::CompiledCache;
pub use directives::{DirectiveEngine, TemplateLoader};
pub use renderer::TemplateRenderer;
pub use stash::{ProducerFn, Stash, Value};
pub use substitute::Mode;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Tags, TemplatesConfig};
use crate::core::{Result, StitchError};
use crate::paths::SearchRoots;
use crate::store::FileStore;

/// A configured template set.
///
/// All caches are concurrent, so one instance can be shared behind an
/// [`Arc`] and serve requests from several tasks.
#[derive(Debug)]
pub struct Templates {
    roots: SearchRoots,
    extension: String,
    cache_compiled: bool,
    files: FileStore,
    compiled: CompiledCache,
    directives: DirectiveEngine,
    renderer: TemplateRenderer,
}

impl Templates {
    /// Build a template set from `config`.
    ///
    /// Every root is located up front and, with `preload` enabled, every
    /// template below them is read.
    ///
    /// # Errors
    ///
    /// - [`StitchError::Config`](crate::core::StitchError::Config) if the
    ///   configuration is invalid
    /// - [`StitchError::RootNotFound`](crate::core::StitchError::RootNotFound)
    ///   if a root cannot be located
    /// - a read error if preloading fails
    pub async fn new(config: TemplatesConfig) -> Result<Self> {
        config.validate()?;
        let roots = SearchRoots::locate(&config.roots)?;
        let directives = DirectiveEngine::new(&config.tags, config.include_limit)?;

        let templates = Self {
            extension: config.extension,
            cache_compiled: config.cache_compiled,
            files: FileStore::new(),
            compiled: CompiledCache::new(config.compiled_suffix, config.verify_freshness),
            directives,
            renderer: TemplateRenderer::new(config.tags),
            roots,
        };

        if config.preload {
            templates.files.preload(templates.roots.as_slice(), &templates.extension).await?;
        }

        tracing::debug!(
            "Template set ready: {} root(s), include limit {}",
            templates.roots.as_slice().len(),
            templates.directives.include_limit()
        );
        Ok(templates)
    }

    /// The located search roots.
    pub fn roots(&self) -> &SearchRoots {
        &self.roots
    }

    /// The template extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The placeholder delimiters.
    pub fn tags(&self) -> &Tags {
        self.renderer.tags()
    }

    /// The include nesting limit.
    pub fn include_limit(&self) -> usize {
        self.directives.include_limit()
    }

    /// Change the include nesting limit.
    ///
    /// Templates already compiled keep their flattened text.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Config`] for a limit of zero, like
    /// [`TemplatesConfig::validate`].
    pub fn set_include_limit(&mut self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(StitchError::Config {
                path: PathBuf::from("<memory>"),
                message: "include_limit must be at least 1".to_string(),
            });
        }
        self.directives.set_include_limit(limit);
        Ok(())
    }

    /// Whether compiled templates are cached.
    pub fn cache_compiled(&self) -> bool {
        self.cache_compiled
    }

    /// Enable or disable compiled template caching.
    pub fn set_cache_compiled(&mut self, enabled: bool) {
        self.cache_compiled = enabled;
    }

    /// The compiled template cache.
    pub fn compiled_cache(&self) -> &CompiledCache {
        &self.compiled
    }

    /// Resolve a logical name to the path it would be read from.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.roots.resolve(name, &self.extension)
    }

    /// Read a template's raw text, from the file store when cached.
    ///
    /// # Errors
    ///
    /// Returns a not-found or read error naming the resolved path.
    pub async fn load_file(&self, name: &str) -> Result<Arc<str>> {
        self.files.load(&self.resolve(name)).await
    }

    /// Flatten a template: resolve its wrapper and include directives.
    ///
    /// With caching enabled, the result is taken from memory or from the
    /// on-disk artifact when available, and stored otherwise. The artifact
    /// write runs in the background; see [`Templates::wait_for_writes`].
    ///
    /// # Errors
    ///
    /// Propagates read errors. A too deeply nested include chain yields the
    /// fatal [`StitchError::IncludeLimitExceeded`](crate::core::StitchError::IncludeLimitExceeded).
    pub async fn compile(&self, name: &str) -> Result<Arc<str>> {
        let path = self.resolve(name);
        if self.cache_compiled
            && let Some(text) = self.compiled.get(&path).await
        {
            return Ok(text);
        }

        let raw = self.files.load(&path).await?;
        let text: Arc<str> = self.directives.flatten(&raw, self).await?.into();
        tracing::debug!("Compiled {} ({} bytes)", path.display(), text.len());

        if self.cache_compiled {
            self.compiled.store(&path, Arc::clone(&text))?;
        }
        Ok(text)
    }

    /// Blocking counterpart of [`Templates::load_file`].
    ///
    /// Producers run synchronously during a render and cannot await; this is
    /// how they read a partial.
    ///
    /// # Errors
    ///
    /// Returns a not-found or read error naming the resolved path.
    pub fn load_file_blocking(&self, name: &str) -> Result<Arc<str>> {
        self.files.load_blocking(&self.resolve(name))
    }

    /// Blocking counterpart of [`Templates::compile`], for partials that
    /// carry their own wrapper or include directives and are prepared inside
    /// a producer.
    ///
    /// Called within a Tokio runtime, the artifact write joins the pending
    /// writes awaited by [`Templates::wait_for_writes`], so a render through
    /// [`Templates::execute`] reports its failure.
    ///
    /// # Errors
    ///
    /// Same as [`Templates::compile`]. Outside a runtime a failed artifact
    /// write is returned directly.
    pub fn compile_blocking(&self, name: &str) -> Result<Arc<str>> {
        let path = self.resolve(name);
        if self.cache_compiled
            && let Some(text) = self.compiled.get_blocking(&path)
        {
            return Ok(text);
        }

        let raw = self.files.load_blocking(&path)?;
        // Every load is a plain file read, so the future never waits
        let flattened = futures::executor::block_on(self.directives.flatten(&raw, &BlockingLoader(self)))?;
        let text: Arc<str> = flattened.into();
        tracing::debug!("Compiled {} ({} bytes)", path.display(), text.len());

        if self.cache_compiled {
            self.compiled.store(&path, Arc::clone(&text))?;
        }
        Ok(text)
    }

    /// Compile `name` and render it strictly into `out`.
    ///
    /// Waits for the background artifact write before returning. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Compilation errors are returned before anything is written. A failed
    /// artifact write is reported as the fatal
    /// [`StitchError::PersistFailed`](crate::core::StitchError::PersistFailed),
    /// even when rendering succeeded.
    pub async fn execute<W: Write>(&self, out: &mut W, name: &str, stash: &mut Stash) -> Result<u64> {
        let compiled = self.compile(name).await?;
        let rendered = self.renderer.render(&compiled, out, stash);
        self.wait_for_writes().await?;
        rendered
    }

    /// Wait for every pending compiled artifact write.
    ///
    /// # Errors
    ///
    /// Returns the fatal `PersistFailed` error of the first failed write.
    pub async fn wait_for_writes(&self) -> Result<()> {
        self.compiled.wait_for_writes().await
    }

    /// Strictly render a template string with this set's delimiters.
    pub fn render_partial(&self, template: &str, stash: &mut Stash) -> Result<String> {
        self.renderer.render_string(template, stash, Mode::Strict)
    }

    /// Render a template string, keeping placeholders missing from `stash`.
    pub fn render_partial_std(&self, template: &str, stash: &mut Stash) -> Result<String> {
        self.renderer.render_string(template, stash, Mode::KeepUnknown)
    }

    /// Render a template string into `out`, keeping placeholders missing
    /// from `stash`.
    pub fn render_partial_to<W: Write>(&self, template: &str, out: &mut W, stash: &mut Stash) -> Result<u64> {
        self.renderer.render_with_mode(template, out, stash, Mode::KeepUnknown)
    }

    /// Forget the raw and compiled text of `name` held in memory.
    ///
    /// The on-disk artifact is kept; the next compile reloads it. Returns
    /// whether anything was cached.
    pub fn evict(&self, name: &str) -> bool {
        let path = self.resolve(name);
        let raw = self.files.evict(&path);
        let compiled = self.compiled.evict(&path);
        raw || compiled
    }

    /// Delete every compiled artifact below the roots and clear the memory
    /// caches. Returns the number of deleted artifacts.
    ///
    /// # Errors
    ///
    /// Fails if a pending write fails or an artifact cannot be removed.
    pub async fn purge_compiled(&self) -> Result<usize> {
        self.files.clear();
        let removed = self.compiled.purge(self.roots.as_slice(), &self.extension).await?;
        tracing::info!("Purged {} compiled template(s)", removed);
        Ok(removed)
    }

    /// Compiled cache statistics as `(hits, misses)`.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.compiled.stats()
    }
}

impl TemplateLoader for Templates {
    async fn load_template(&self, name: &str) -> Result<Arc<str>> {
        self.load_file(name).await
    }
}

/// Loads through the blocking file store path.
struct BlockingLoader<'a>(&'a Templates);

impl TemplateLoader for BlockingLoader<'_> {
    async fn load_template(&self, name: &str) -> Result<Arc<str>> {
        self.0.load_file_blocking(name)
    }
}
