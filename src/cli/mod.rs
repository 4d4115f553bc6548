//! Command-line interface for stitch.
//!
//! # Commands
//!
//! - `render` - compile a template and render it with `--set KEY=VALUE` values
//! - `compile` - print the flattened text of a template
//! - `purge` - delete compiled artifacts under the roots
//!
//! # Global Options
//!
//! - `--config` - configuration file (default: `./stitch.toml`, then
//!   `<config dir>/stitch/config.toml`)
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//!
//! `RUST_LOG` takes precedence over both logging flags.
//!
//! # Examples
//!
//! ```bash
//! stitch render view --root ./templates --set title=Hello
//! stitch render view -r ./themes/dark -r ./templates --output view.html
//! stitch compile view --root ./templates --no-cache
//! stitch purge --root ./templates
//! ```

mod common;
mod compile;
mod purge;
mod render;

pub use common::TemplateArgs;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Compose and render text templates with wrappers and includes.
#[derive(Parser, Debug)]
#[command(name = "stitch", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and suppress status messages
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "STITCH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a template and render it
    Render(render::RenderCommand),

    /// Print the flattened text of a template
    Compile(compile::CompileCommand),

    /// Delete compiled artifacts under every root
    Purge(purge::PurgeCommand),
}

impl Cli {
    /// Install logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        let config = self.config.as_deref();
        match self.command {
            Commands::Render(cmd) => cmd.execute(config).await,
            Commands::Compile(cmd) => cmd.execute(config).await,
            Commands::Purge(cmd) => cmd.execute(config, self.quiet).await,
        }
    }

    /// The log filter implied by the verbosity flags.
    fn log_filter(verbose: bool, quiet: bool) -> &'static str {
        if verbose {
            "debug"
        } else if quiet {
            "error"
        } else {
            "warn"
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(Cli::log_filter(verbose, quiet))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
