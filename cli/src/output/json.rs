//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: the command's result, or an error object.

use anyhow::{Context, Result};
use serde::Serialize;
use wslm_common::ErrorKind;

use crate::domain::classify::UserMessage;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "code": "WSL_NOT_INSTALLED",
///   "kind": "wsl_not_installed",
///   "title": "...",
///   "message": "...",
///   "suggestedAction": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice; `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(kind: Option<ErrorKind>, msg: &UserMessage) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "code": kind.map_or("ERROR", |k| k.code()),
        "kind": kind,
        "title": msg.title,
        "message": msg.detail,
        "suggestedAction": msg.suggested_action,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print `value` as one JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }
}
