//! `stitch compile`: print the flattened text of a template.

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;

use super::common::TemplateArgs;

/// Resolve wrapper and include directives and print the result.
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Template name, relative to the roots, with or without extension
    name: String,

    #[command(flatten)]
    templates: TemplateArgs,
}

impl CompileCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let templates = self.templates.build(config_path).await?;
        let compiled = templates
            .compile(&self.name)
            .await
            .with_context(|| format!("Failed to compile '{}'", self.name))?;
        templates.wait_for_writes().await?;

        let mut stdout = io::stdout().lock();
        stdout.write_all(compiled.as_bytes()).context("Failed to write to stdout")?;
        if !compiled.ends_with('\n') {
            stdout.write_all(b"\n").context("Failed to write to stdout")?;
        }
        Ok(())
    }
}
