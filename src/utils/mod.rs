//! Cross-platform utilities used by the template pipeline.
//!
//! - [`fs`] - readability checks, private atomic writes and artifact discovery
//! - [`platform`] - path expansion and program-location helpers

pub mod fs;
pub mod platform;

pub use fs::{dir_exists, file_is_readable, write_private};
pub use platform::{executable_dir, expand_path};
