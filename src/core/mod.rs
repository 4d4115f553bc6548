//! Core types shared by every stitch module.
//!
//! Currently this is the error system: [`StitchError`] for the library surface
//! and [`ErrorContext`] / [`user_friendly_error`] for presenting failures on the
//! command line.

pub mod error;

pub use error::{ErrorContext, Result, StitchError, user_friendly_error};
