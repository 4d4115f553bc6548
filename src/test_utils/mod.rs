//! Test utilities for stitch
//!
//! Helpers shared by unit and integration tests:
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once
//! - [`TemplateTree`] / [`TemplateTreeBuilder`] lay out template files in a
//!   temporary directory
//! - [`fixtures`] holds reusable template sets
//!
//! # Example
//!
//! ```rust,no_run
//! use stitch::test_utils::TemplateTreeBuilder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let tree = TemplateTreeBuilder::new()?
//!     .with_file("view.htm", "<h1>${title}</h1>")
//!     .build()?;
//! let templates = tree.templates().await?;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod tree;

pub use tree::{TemplateTree, TemplateTreeBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=stitch=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
