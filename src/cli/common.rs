//! Options shared by every subcommand that works on a template set.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::{Tags, TemplatesConfig};
use crate::templating::Templates;

/// Template set options.
///
/// Values given on the command line override the configuration file, which
/// overrides the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct TemplateArgs {
    /// Template root directory. Repeat to add fallbacks; the first root containing a template wins
    #[arg(short, long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Template file extension
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Opening placeholder delimiter
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    pub open_tag: Option<String>,

    /// Closing placeholder delimiter
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    pub close_tag: Option<String>,

    /// Maximum nesting depth of include directives
    #[arg(long, value_name = "N")]
    pub include_limit: Option<usize>,

    /// Do not read or write compiled templates
    #[arg(long)]
    pub no_cache: bool,

    /// Read every template under the roots up front
    #[arg(long)]
    pub preload: bool,
}

impl TemplateArgs {
    /// Build the effective configuration.
    ///
    /// An explicit `config_path` must exist. Without one, the usual locations
    /// are searched and defaults are used when nothing is found.
    pub async fn resolve_config(&self, config_path: Option<&Path>) -> Result<TemplatesConfig> {
        let base = match config_path {
            Some(path) => TemplatesConfig::load(path).await?,
            None => TemplatesConfig::discover().await?.unwrap_or_default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut config: TemplatesConfig) -> TemplatesConfig {
        if !self.roots.is_empty() {
            config.roots.clone_from(&self.roots);
        }
        if let Some(ext) = &self.ext {
            config.extension.clone_from(ext);
        }
        if self.open_tag.is_some() || self.close_tag.is_some() {
            let open = self.open_tag.as_deref().unwrap_or(&config.tags.open);
            let close = self.close_tag.as_deref().unwrap_or(&config.tags.close);
            config.tags = Tags::new(open, close);
        }
        if let Some(limit) = self.include_limit {
            config.include_limit = limit;
        }
        if self.no_cache {
            config.cache_compiled = false;
        }
        if self.preload {
            config.preload = true;
        }
        config
    }

    /// Build the template set.
    pub async fn build(&self, config_path: Option<&Path>) -> Result<Templates> {
        let config = self.resolve_config(config_path).await?;
        tracing::debug!("Effective configuration: {:?}", config);
        Templates::new(config).await.context("Failed to set up the template set")
    }
}
