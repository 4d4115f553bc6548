//! Wrapper and include directive resolution.
//!
//! Two directives are recognized, written with the configured delimiters:
//!
//! - `${wrapper layouts/main}` - wrap this file into `layouts/main`, replacing
//!   the wrapper's `${content}` placeholder. Only the first one in a file counts.
//! - `${include partials/header}` - splice in `partials/header`, after
//!   resolving that file's own wrapper and include directives.
//!
//! Paths may contain ASCII letters, digits, `_`, `.`, `-` and `/`.
//!
//! Resolution runs the wrap pass and then the include pass over a text body.
//! Included files are wrapped and then included recursively; the depth of that
//! recursion is passed explicitly and capped by the include limit. Reaching the
//! cap is [fatal](crate::core::StitchError::is_fatal). All other placeholders
//! survive untouched for the final render.

use regex::Regex;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use super::stash::Stash;
use super::substitute;
use crate::config::Tags;
use crate::constants::CONTENT_PLACEHOLDER;
use crate::core::{Result, StitchError};

/// Character class accepted in directive paths.
const PATH_CLASS: &str = r"[A-Za-z0-9_./-]+";

/// Source of template text for the directive engine.
///
/// [`Templates`](super::Templates) implements it by resolving the name against
/// its search roots and reading through its file store.
pub trait TemplateLoader: Sync {
    /// Load the raw text of a template by logical name.
    fn load_template(&self, name: &str) -> impl Future<Output = Result<Arc<str>>> + Send;
}

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Resolves wrapper and include directives for one delimiter pair.
#[derive(Debug, Clone)]
pub struct DirectiveEngine {
    tags: Tags,
    include_limit: usize,
    wrapper_re: Regex,
    include_re: Regex,
}

impl DirectiveEngine {
    /// Build the engine, compiling the directive patterns for `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Config`] if the delimiters produce an invalid
    /// pattern (for example when they are absurdly long).
    pub fn new(tags: &Tags, include_limit: usize) -> Result<Self> {
        let open = regex::escape(&tags.open);
        let close = regex::escape(&tags.close);

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| StitchError::Config {
                path: PathBuf::from("<memory>"),
                message: format!("cannot build directive pattern from delimiters: {e}"),
            })
        };

        Ok(Self {
            tags: tags.clone(),
            include_limit,
            // The directive's own line break goes with it
            wrapper_re: compile(format!(r"{open}wrapper\s+({PATH_CLASS}){close}\r?\n?"))?,
            include_re: compile(format!(r"{open}(include\s+({PATH_CLASS})){close}"))?,
        })
    }

    /// The configured include limit.
    pub fn include_limit(&self) -> usize {
        self.include_limit
    }

    /// Change the include limit. With zero, every include directive is
    /// rejected.
    pub fn set_include_limit(&mut self, limit: usize) {
        self.include_limit = limit;
    }

    /// Run the wrap pass and then the include pass over a document body.
    pub async fn flatten<L: TemplateLoader>(&self, text: &str, loader: &L) -> Result<String> {
        let wrapped = self.wrap(text, loader).await?;
        self.include(wrapped, loader, 0).await
    }

    /// Apply the first wrapper directive in `text`, if any.
    ///
    /// One trailing newline is trimmed from both the text and the wrapper.
    /// The wrapper file's own directives are not processed here; include
    /// directives it contains are resolved by the include pass that follows.
    pub async fn wrap<L: TemplateLoader>(&self, text: &str, loader: &L) -> Result<String> {
        let text = trim_newline(text);
        let Some(caps) = self.wrapper_re.captures(text) else {
            return Ok(text.to_string());
        };
        let (directive, path) = match (caps.get(0), caps.get(1)) {
            (Some(directive), Some(path)) => (directive.as_str(), path.as_str()),
            _ => return Ok(text.to_string()),
        };

        tracing::debug!("Wrapping into '{}'", path);
        let wrapper = loader.load_template(path).await?;
        let body = text.replacen(directive, "", 1);

        let mut stash = Stash::new();
        stash.insert(CONTENT_PLACEHOLDER, body);
        substitute::execute_string_std(trim_newline(&wrapper), &self.tags, &mut stash)
            .map_err(|source| StitchError::Render {
                source,
            })
    }

    /// Replace every include directive in `text` with the resolved target.
    ///
    /// `depth` is the nesting level of `text`: 0 for the compiled document, 1
    /// for a file it includes, and so on. Finding an include directive at a
    /// depth equal to the limit aborts with
    /// [`StitchError::IncludeLimitExceeded`].
    pub fn include<'a, L: TemplateLoader>(
        &'a self,
        text: String,
        loader: &'a L,
        depth: usize,
    ) -> ResolveFuture<'a> {
        Box::pin(async move {
            let matches: Vec<(String, String)> = self
                .include_re
                .captures_iter(&text)
                .filter_map(|caps| Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string())))
                .collect();

            if matches.is_empty() {
                return Ok(text);
            }
            tracing::debug!("Found {} include(s) at depth {}", matches.len(), depth);

            let mut resolved = Stash::new();
            for (tag, path) in matches {
                if depth >= self.include_limit {
                    tracing::error!(
                        "Limit of {} nested inclusions reached while trying to include '{}'",
                        self.include_limit,
                        path
                    );
                    return Err(StitchError::IncludeLimitExceeded {
                        limit: self.include_limit,
                        path,
                    });
                }

                let content = loader.load_template(&path).await.inspect_err(|e| {
                    tracing::warn!("Cannot include '{}': {}", path, e);
                })?;
                let wrapped = self.wrap(trim_newline(&content), loader).await?;
                let content = self.include(wrapped, loader, depth + 1).await?;
                resolved.insert(tag, content);
            }

            substitute::execute_string_std(&text, &self.tags, &mut resolved).map_err(|source| {
                StitchError::Render {
                    source,
                }
            })
        })
    }
}

fn trim_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}
