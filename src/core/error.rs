//! Error handling for stitch
//!
//! The library surface returns [`StitchError`], a strongly-typed enum covering
//! every failure the composition pipeline can produce. The CLI works with
//! [`anyhow::Error`] and converts whatever bubbles up into an [`ErrorContext`]
//! through [`user_friendly_error`] before printing it.
//!
//! # Error Categories
//!
//! - **Configuration**: [`StitchError::RootNotFound`], [`StitchError::Config`]
//! - **File access**: [`StitchError::NotFound`], [`StitchError::Read`]
//! - **Output**: [`StitchError::Render`]
//! - **Fatal**: [`StitchError::IncludeLimitExceeded`], [`StitchError::PersistFailed`]
//!
//! # Fatal Errors
//!
//! Two variants are *fatal*: a runaway include chain and a failed write of a
//! compiled artifact. They travel through the same `Result` channel as every
//! other error, but [`StitchError::is_fatal`] reports them and callers must not
//! catch them and keep producing output. The request that hit one is over.
//!
//! ```rust,no_run
//! use stitch::core::StitchError;
//!
//! fn handle(result: Result<u64, StitchError>) {
//!     match result {
//!         Ok(written) => println!("wrote {written} bytes"),
//!         Err(e) if e.is_fatal() => {
//!             tracing::error!("{e}");
//!             std::process::exit(101);
//!         }
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T, E = StitchError> = std::result::Result<T, E>;

/// The main error type for template composition.
#[derive(Error, Debug)]
pub enum StitchError {
    /// A configured search root is not an existing directory.
    ///
    /// Reported at construction time; no partially initialized instance is
    /// ever returned.
    #[error("template root directory '{}' does not exist", path.display())]
    RootNotFound {
        /// The last location that was tried for the root
        path: PathBuf,
    },

    /// The configuration file could not be read or parsed, or holds invalid values.
    #[error("invalid configuration in '{}': {message}", path.display())]
    Config {
        /// Path of the configuration file (or `<memory>` for programmatic configs)
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// A template, include or wrapper file does not exist.
    #[error("file '{}' could not be read: no such file", path.display())]
    NotFound {
        /// The resolved path that was tried
        path: PathBuf,
    },

    /// A template, include or wrapper file exists but could not be read.
    #[error("file '{}' could not be read: {source}", path.display())]
    Read {
        /// The resolved path that was tried
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Include directives are nested deeper than the configured limit.
    ///
    /// Fatal: the template tree most likely includes itself.
    #[error("limit of {limit} nested inclusions reached while trying to include '{path}'")]
    IncludeLimitExceeded {
        /// The configured include limit
        limit: usize,
        /// The include target that would have exceeded it
        path: String,
    },

    /// Writing a compiled artifact to disk failed.
    ///
    /// Fatal: the environment cannot persist compiled templates.
    #[error("failed to store compiled template '{}': {source}", path.display())]
    PersistFailed {
        /// Path of the artifact that could not be written
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The output sink rejected a write during rendering.
    #[error("failed to write rendered output: {source}")]
    Render {
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl StitchError {
    /// Build a file access error from an I/O failure, keeping "not found"
    /// distinct from every other read failure.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path,
            }
        } else {
            Self::Read {
                path,
                source,
            }
        }
    }

    /// Whether this error must terminate the current request.
    ///
    /// A fatal error is never converted into normal output by a caller.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IncludeLimitExceeded {
                ..
            } | Self::PersistFailed {
                ..
            }
        )
    }
}

/// Error wrapper carrying a user-facing suggestion and details.
///
/// Produced by [`user_friendly_error`] and printed by the binary.
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message
    pub message: String,
    /// Whether the originating error was fatal
    pub fatal: bool,
    /// Actionable suggestion for the user
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context from a bare message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        let label = if self.fatal {
            "fatal"
        } else {
            "error"
        };
        eprintln!("{}: {}", label.red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// [`StitchError`] variants get tailored advice; anything else is shown with
/// its full `anyhow` cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // downcast_ref also sees through `.context(...)` layers
    if let Some(stitch_error) = error.downcast_ref::<StitchError>() {
        let mut ctx = create_error_context(stitch_error);
        let outer = error.to_string();
        if outer != ctx.message {
            ctx.message = format!("{outer}: {}", ctx.message);
        }
        return ctx;
    }

    ErrorContext::new(format!("{error:#}"))
}

fn create_error_context(error: &StitchError) -> ErrorContext {
    let ctx = ErrorContext {
        message: error.to_string(),
        fatal: error.is_fatal(),
        suggestion: None,
        details: None,
    };

    match error {
        StitchError::RootNotFound {
            ..
        } => ctx
            .with_suggestion("Create the directory or fix the --root / `roots` entry")
            .with_details(
                "Relative roots are looked up next to the executable first, then in the current directory",
            ),
        StitchError::Config {
            ..
        } => ctx.with_suggestion("Check the TOML syntax and the values in the configuration file"),
        StitchError::NotFound {
            ..
        } => ctx.with_suggestion(
            "Check the template name and the include/wrapper paths; names are resolved against every root in order",
        ),
        StitchError::Read {
            ..
        } => ctx.with_suggestion("Check the file permissions and that the file is valid UTF-8"),
        StitchError::IncludeLimitExceeded {
            ..
        } => ctx
            .with_suggestion("Look for a template that includes itself, or raise `include_limit`")
            .with_details("Include chains deeper than the limit are treated as authoring bugs"),
        StitchError::PersistFailed {
            ..
        } => ctx
            .with_suggestion("Make the template directories writable, or disable caching with --no-cache")
            .with_details("Compiled templates are stored next to their sources"),
        StitchError::Render {
            ..
        } => ctx,
    }
}
