//! Default values used throughout stitch.
//!
//! Defining them centrally keeps the configuration defaults, the CLI defaults
//! and the documentation in agreement.

/// Default template file extension.
pub const DEFAULT_EXTENSION: &str = ".htm";

/// Default opening placeholder delimiter.
pub const DEFAULT_OPEN_TAG: &str = "${";

/// Default closing placeholder delimiter.
pub const DEFAULT_CLOSE_TAG: &str = "}";

/// Default maximum nesting depth of include directives.
///
/// Counted from 0 in the compiled document: with a limit of 3 the document may
/// include a file, which includes a file, which includes a file, and that last
/// file may not include anything.
pub const DEFAULT_INCLUDE_LIMIT: usize = 3;

/// Suffix appended to a template's path to name its compiled artifact.
///
/// `view.htm` is stored as `view.htmc`.
pub const DEFAULT_COMPILED_SUFFIX: &str = "c";

/// Placeholder in wrapper templates that receives the wrapped content.
pub const CONTENT_PLACEHOLDER: &str = "content";

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "stitch.toml";
