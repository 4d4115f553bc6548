//! `stitch purge`: delete compiled artifacts.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::common::TemplateArgs;

/// Delete every compiled artifact under the template roots.
#[derive(Args, Debug)]
pub struct PurgeCommand {
    #[command(flatten)]
    templates: TemplateArgs,
}

impl PurgeCommand {
    pub async fn execute(self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let templates = self.templates.build(config_path).await?;
        let removed = templates
            .purge_compiled()
            .await
            .context("Failed to purge compiled templates")?;

        if !quiet {
            println!("{} Removed {} compiled template(s)", "✓".green(), removed);
        }
        Ok(())
    }
}
