//! `stitch render`: compile a template and render it with values from the
//! command line.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::common::TemplateArgs;
use crate::templating::Stash;

/// Render a template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template name, relative to the roots, with or without extension
    name: String,

    /// Placeholder value as KEY=VALUE; may be repeated
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    values: Vec<(String, String)>,

    /// Write the output to FILE instead of stdout; FILE is left untouched
    /// when rendering fails
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    templates: TemplateArgs,
}

impl RenderCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let templates = self.templates.build(config_path).await?;
        let mut stash: Stash = self.values.into_iter().collect();

        let written = match &self.output {
            Some(path) => {
                // Nothing touches the output file until rendering has succeeded
                let mut rendered = Vec::new();
                let written = templates
                    .execute(&mut rendered, &self.name, &mut stash)
                    .await
                    .with_context(|| format!("Failed to render '{}'", self.name))?;
                tokio::fs::write(path, &rendered)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written
            }
            None => {
                let mut out = BufWriter::new(io::stdout().lock());
                let written = templates
                    .execute(&mut out, &self.name, &mut stash)
                    .await
                    .with_context(|| format!("Failed to render '{}'", self.name))?;
                out.flush().context("Failed to write to stdout")?;
                written
            }
        };

        tracing::info!("Rendered '{}' ({} bytes)", self.name, written);
        Ok(())
    }
}

fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{arg}'"))?;
    if key.is_empty() {
        return Err(anyhow!("placeholder name must not be empty in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
