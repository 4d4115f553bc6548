//! Final rendering of compiled templates.
//!
//! [`TemplateRenderer`] performs the strict substitution pass that produces a
//! request's output: every placeholder is replaced by its stash value, and
//! placeholders without a value disappear.

use std::io::Write;

use super::stash::Stash;
use super::substitute::{self, Mode};
use crate::config::Tags;
use crate::core::{Result, StitchError};

/// Renders compiled templates with one delimiter pair.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    tags: Tags,
}

impl TemplateRenderer {
    /// Create a renderer for `tags`.
    pub fn new(tags: Tags) -> Self {
        Self {
            tags,
        }
    }

    /// The delimiters this renderer substitutes.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Strictly render `compiled` into `out`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Render`] if the sink rejects a write or a
    /// producer fails.
    pub fn render(&self, compiled: &str, out: &mut dyn Write, stash: &mut Stash) -> Result<u64> {
        self.render_with_mode(compiled, out, stash, Mode::Strict)
    }

    /// Render `template` into `out` with an explicit [`Mode`].
    pub fn render_with_mode(
        &self,
        template: &str,
        out: &mut dyn Write,
        stash: &mut Stash,
        mode: Mode,
    ) -> Result<u64> {
        substitute::execute_with_mode(template, &self.tags, out, stash, mode).map_err(|source| {
            tracing::warn!("Rendering failed: {}", source);
            StitchError::Render {
                source,
            }
        })
    }

    /// Render `template` into a string with an explicit [`Mode`].
    pub fn render_string(&self, template: &str, stash: &mut Stash, mode: Mode) -> Result<String> {
        let mut buf = Vec::with_capacity(template.len());
        self.render_with_mode(template, &mut buf, stash, mode)?;
        Ok(String::from_utf8(buf)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
