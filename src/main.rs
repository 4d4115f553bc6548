//! stitch CLI entry point
//!
//! Parses the command line, runs the selected command and prints failures
//! through [`user_friendly_error`]. Fatal template errors (a runaway include
//! chain, a compiled template that cannot be stored) exit with status 101,
//! every other failure with status 1.

use anyhow::Result;
use clap::Parser;
use stitch::cli;
use stitch::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(if error_ctx.fatal {
                101
            } else {
                1
            });
        }
    }
}
