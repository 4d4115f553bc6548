//! Configuration for a [`Templates`](crate::templating::Templates) instance.
//!
//! A configuration is either built in code with the `with_*` methods or read
//! from a TOML file:
//!
//! ```toml
//! roots = ["./templates", "./templates/theme"]
//! extension = ".htm"
//! include_limit = 3
//! cache_compiled = true
//! compiled_suffix = "c"
//! preload = false
//! verify_freshness = false
//!
//! [tags]
//! open = "${"
//! close = "}"
//! ```
//!
//! Every field except `roots` has a default. Root entries may use `~` and
//! environment variables; they are expanded when the file is loaded.
//!
//! # Discovery
//!
//! [`TemplatesConfig::discover`] looks for `./stitch.toml` first and then for
//! `stitch/config.toml` in the platform configuration directory
//! (`~/.config` on Linux, `~/Library/Application Support` on macOS,
//! `%APPDATA%` on Windows).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_CLOSE_TAG, DEFAULT_COMPILED_SUFFIX, DEFAULT_EXTENSION,
    DEFAULT_INCLUDE_LIMIT, DEFAULT_OPEN_TAG,
};
use crate::core::StitchError;

/// Pair of placeholder delimiters, for example `${` and `}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    /// Opening delimiter
    pub open: String,
    /// Closing delimiter
    pub close: String,
}

impl Tags {
    /// Create a delimiter pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Wrap a tag name in the delimiters: `title` becomes `${title}`.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{}{}", self.open, name, self.close)
    }
}

impl Default for Tags {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_TAG, DEFAULT_CLOSE_TAG)
    }
}

/// Construction-time settings of a template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Search roots, tried in order. The first root containing a template wins.
    pub roots: Vec<PathBuf>,

    /// Extension appended to template names that lack it, e.g. `.htm`.
    pub extension: String,

    /// Placeholder delimiters.
    pub tags: Tags,

    /// Load every template under the roots while constructing the instance.
    pub preload: bool,

    /// Maximum nesting depth of include directives.
    pub include_limit: usize,

    /// Cache compiled templates in memory and on disk.
    ///
    /// Turn this off while editing templates so every request re-resolves
    /// wrapper and include directives.
    pub cache_compiled: bool,

    /// Suffix appended to a template path to name its compiled artifact.
    pub compiled_suffix: String,

    /// Ignore compiled artifacts older than their source template.
    ///
    /// Off by default: artifacts never expire and must be purged when
    /// templates change. Only the compiled document's own source is compared,
    /// not the files it includes.
    pub verify_freshness: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            tags: Tags::default(),
            preload: false,
            include_limit: DEFAULT_INCLUDE_LIMIT,
            cache_compiled: true,
            compiled_suffix: DEFAULT_COMPILED_SUFFIX.to_string(),
            verify_freshness: false,
        }
    }
}

impl TemplatesConfig {
    /// Configuration with a single search root and default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            ..Self::default()
        }
    }

    /// Configuration with several search roots and default settings.
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the template extension.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the placeholder delimiters.
    #[must_use]
    pub fn tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.tags = Tags::new(open, close);
        self
    }

    /// Enable or disable preloading of all templates.
    #[must_use]
    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// Set the include nesting limit.
    #[must_use]
    pub fn include_limit(mut self, limit: usize) -> Self {
        self.include_limit = limit;
        self
    }

    /// Enable or disable compiled template caching.
    #[must_use]
    pub fn cache_compiled(mut self, enabled: bool) -> Self {
        self.cache_compiled = enabled;
        self
    }

    /// Set the compiled artifact suffix.
    #[must_use]
    pub fn compiled_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.compiled_suffix = suffix.into();
        self
    }

    /// Enable or disable the artifact freshness check.
    #[must_use]
    pub fn verify_freshness(mut self, enabled: bool) -> Self {
        self.verify_freshness = enabled;
        self
    }

    /// Load a configuration file.
    ///
    /// Root entries are expanded (`~`, `$VAR`) and relative roots are kept
    /// relative: they are located when the template set is constructed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or a
    /// root entry references an undefined environment variable.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.roots = config
            .roots
            .iter()
            .map(|root| crate::utils::expand_path(&root.to_string_lossy()))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid root in {}", path.display()))?;

        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Locate and load the configuration file, if any.
    ///
    /// Returns `Ok(None)` when neither `./stitch.toml` nor the per-user
    /// configuration file exists.
    pub async fn discover() -> Result<Option<Self>> {
        for candidate in Self::candidate_paths() {
            if candidate.is_file() {
                return Self::load(&candidate).await.map(Some);
            }
        }
        Ok(None)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("stitch").join("config.toml"));
        }
        paths
    }

    /// Check the values that would otherwise fail later in confusing ways.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Config`] if there are no roots, the extension
    /// or a delimiter is empty, or the include limit is zero.
    pub fn validate(&self) -> crate::core::Result<()> {
        let invalid = |message: &str| StitchError::Config {
            path: PathBuf::from("<memory>"),
            message: message.to_string(),
        };

        if self.roots.is_empty() {
            return Err(invalid("at least one template root is required"));
        }
        if self.extension.is_empty() {
            return Err(invalid("the template extension must not be empty"));
        }
        if self.tags.open.is_empty() || self.tags.close.is_empty() {
            return Err(invalid("placeholder delimiters must not be empty"));
        }
        if self.include_limit == 0 {
            return Err(invalid("include_limit must be at least 1"));
        }
        if self.compiled_suffix.is_empty() {
            return Err(invalid("compiled_suffix must not be empty"));
        }
        Ok(())
    }
}
