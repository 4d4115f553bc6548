//! File system helpers for template sources and compiled artifacts.
//!
//! Everything here is synchronous. Async callers run the heavier operations
//! (artifact writes, directory walks) inside `spawn_blocking`.

pub mod atomic;
pub mod discovery;
pub mod metadata;

pub use atomic::write_private;
pub use discovery::find_files_with_suffix;
pub use metadata::{dir_exists, file_is_readable, is_older_than};
