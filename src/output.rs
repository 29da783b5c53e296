//! Output and reporting for tagbox-inventory
//!
//! Inventory documents go to stdout as indented JSON; diagnostics go to
//! stderr so stdout stays machine-readable.

use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use crate::error::Result;

/// Render a document as indented JSON
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a document as indented JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut out: W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

/// Print an error message to stderr
pub fn error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Print an informational message to stderr
pub fn notice(msg: &str) {
    eprintln!("{} {}", "[INFO]".cyan(), msg);
}
