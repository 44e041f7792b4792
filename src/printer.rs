//! Output sink for user-facing messages.
//!
//! Diagnostics go through the `log` facade (initialized in `main` with
//! simplelog, writing to stderr) so they never mix with machine-readable
//! output. Raw output is reserved for payloads the user asked for, such as
//! a generated manifest, and always goes to stdout.

use std::io::Write;

pub fn error(msg: &str) {
    log::error!("{msg}");
}

pub fn warning(msg: &str) {
    log::warn!("{msg}");
}

pub fn info(msg: &str) {
    log::info!("{msg}");
}

pub fn debug(msg: &str) {
    log::debug!("{msg}");
}

/// Write a payload to stdout verbatim, without any log decoration.
pub fn raw_output(payload: &str) {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(payload.as_bytes());
    let _ = stdout.flush();
}
