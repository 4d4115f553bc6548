//! stitch - file-based text template composition
//!
//! stitch assembles text documents (typically HTML) from template files on
//! disk. A template may wrap itself into a layout and include partials; those
//! directives are resolved once, the flattened result is cached in memory and
//! next to the source file, and each request only substitutes placeholders.
//!
//! # Architecture Overview
//!
//! A request for a logical template name flows through:
//!
//! 1. [`paths`] - resolves the name against an ordered list of search roots
//!    (the first root containing the file wins, so a theme can override a base)
//! 2. [`templating::cache`] - returns the flattened text if it was compiled
//!    before
//! 3. [`store`] - otherwise loads the raw source, memoized per path
//! 4. [`templating::directives`] - applies the wrapper directive, then resolves
//!    include directives recursively up to a depth limit
//! 5. [`templating::renderer`] - substitutes the placeholders with values from
//!    a [`templating::Stash`] and streams the result to a writer
//!
//! # Template Syntax
//!
//! With the default `${` / `}` delimiters:
//!
//! ```text
//! ${wrapper layouts/main}
//! <article>
//!   ${include partials/_byline}
//!   <h1>${title}</h1>
//! </article>
//! ```
//!
//! `layouts/main.htm` receives the article in its `${content}` placeholder.
//! `${title}` is filled at render time; placeholders without a value render as
//! nothing.
//!
//! # Modules
//!
//! - [`cli`] - the `stitch` command-line interface
//! - [`config`] - construction-time settings and their TOML form
//! - [`constants`] - default values
//! - [`core`] - error types and user-facing error presentation
//! - [`paths`] - search roots and name resolution
//! - [`store`] - raw template source cache
//! - [`templating`] - directives, compiled cache, substitution and the
//!   [`templating::Templates`] facade
//! - [`utils`] - file system and platform helpers

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod paths;
pub mod store;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::TemplatesConfig;
pub use core::{Result, StitchError};
pub use templating::{Stash, Templates, Value};
