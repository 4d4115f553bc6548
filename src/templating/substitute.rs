//! Minimal placeholder substitution.
//!
//! Placeholders are the raw text between an opening and a closing delimiter:
//! with `${` / `}` the template `Hi ${name}!` has one placeholder, `name`.
//! Tag names are not trimmed, so `${ name }` looks up `" name "`.
//!
//! Two modes exist:
//!
//! - [`Mode::Strict`]: a placeholder missing from the stash renders as nothing.
//! - [`Mode::KeepUnknown`]: a missing placeholder is written back verbatim so a
//!   later pass can fill it. Wrapper and include resolution rely on this.
//!
//! An opening delimiter without a matching closing delimiter is copied to the
//! output together with the rest of the template.

use std::io::{self, Write};

use super::stash::Stash;
use crate::config::Tags;

/// How placeholders missing from the stash are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Missing placeholders produce empty output.
    Strict,
    /// Missing placeholders are kept verbatim, delimiters included.
    KeepUnknown,
}

/// Substitute placeholders in `template`, streaming to `out`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Fails if `out` rejects a write or a producer returns an error.
pub fn execute_with_mode(
    template: &str,
    tags: &Tags,
    out: &mut dyn Write,
    stash: &mut Stash,
    mode: Mode,
) -> io::Result<u64> {
    let mut written: u64 = 0;
    let mut rest = template;

    while let Some(start) = rest.find(tags.open.as_str()) {
        out.write_all(&rest.as_bytes()[..start])?;
        written += start as u64;

        let after_open = &rest[start + tags.open.len()..];
        let Some(end) = after_open.find(tags.close.as_str()) else {
            // No closing delimiter: the remainder, opening delimiter included, is literal
            rest = &rest[start..];
            break;
        };

        let tag = &after_open[..end];
        match stash.write_value(tag, out)? {
            Some(n) => written += n as u64,
            None if mode == Mode::KeepUnknown => {
                let kept = tags.placeholder(tag);
                out.write_all(kept.as_bytes())?;
                written += kept.len() as u64;
            }
            None => {}
        }
        rest = &after_open[end + tags.close.len()..];
    }

    out.write_all(rest.as_bytes())?;
    written += rest.len() as u64;
    Ok(written)
}

/// Strict substitution streaming to `out`.
pub fn execute(template: &str, tags: &Tags, out: &mut dyn Write, stash: &mut Stash) -> io::Result<u64> {
    execute_with_mode(template, tags, out, stash, Mode::Strict)
}

/// Non-strict substitution streaming to `out`; unknown placeholders are kept.
pub fn execute_std(
    template: &str,
    tags: &Tags,
    out: &mut dyn Write,
    stash: &mut Stash,
) -> io::Result<u64> {
    execute_with_mode(template, tags, out, stash, Mode::KeepUnknown)
}

/// Strict substitution returning a string.
///
/// Byte values that are not valid UTF-8 are replaced lossily.
pub fn execute_string(template: &str, tags: &Tags, stash: &mut Stash) -> io::Result<String> {
    to_string(template, tags, stash, Mode::Strict)
}

/// Non-strict substitution returning a string.
pub fn execute_string_std(template: &str, tags: &Tags, stash: &mut Stash) -> io::Result<String> {
    to_string(template, tags, stash, Mode::KeepUnknown)
}

fn to_string(template: &str, tags: &Tags, stash: &mut Stash, mode: Mode) -> io::Result<String> {
    let mut buf = Vec::with_capacity(template.len());
    execute_with_mode(template, tags, &mut buf, stash, mode)?;
    Ok(match String::from_utf8(buf) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
