//! Shared CLI output helpers.
//!
//! Results go to stdout as JSON; diagnostics go to stderr so that output can
//! be piped.

use serde::Serialize;

use crate::error::{Error, Result};

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// Print a value as one compact JSON line on stdout.
pub fn json_line<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string(value)?;
    println!("{rendered}");
    Ok(())
}

/// Print a successful status line.
pub fn ok(message: &str) {
    eprintln!("✓ {message}");
}

/// Print an error status line, with the HTTP-equivalent status code.
pub fn error(err: &Error) {
    eprintln!("✗ {err} (status {})", err.status_code());
}
