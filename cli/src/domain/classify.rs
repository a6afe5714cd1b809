//! Failure classification.
//!
//! Every failure the executor can observe is first captured as a
//! [`RawFailure`], then mapped onto the closed [`ErrorKind`] taxonomy by
//! [`classify`]. [`to_user_message`] turns the result into text that is safe
//! to show: no stack traces, no local paths the user did not type.

use std::io;
use std::time::Duration;

use serde::Serialize;
use wslm_common::ErrorKind;

use crate::domain::encoding::normalize_output;
use crate::domain::error::{ProcessError, ValidationError};

/// Longest detail shown for an `UnknownError`.
pub const UNKNOWN_DETAIL_MAX: usize = 200;

/// Errno-style codes reported by the download collaborator.
pub const NETWORK_CODES: &[&str] = &[
    "ENOTFOUND",
    "ECONNREFUSED",
    "ECONNRESET",
    "ETIMEDOUT",
    "EAI_AGAIN",
];

/// `wsl.exe` output fragments, matched case-insensitively.
///
/// Checked in order; the first hit wins.
pub const STDERR_PATTERNS: &[(&str, ErrorKind)] = &[
    (
        "there is no distribution with the supplied name",
        ErrorKind::DistributionNotFound,
    ),
    ("wsl_e_distro_not_found", ErrorKind::DistributionNotFound),
    (
        "a distribution with the supplied name already exists",
        ErrorKind::DistributionAlreadyExists,
    ),
    ("error_already_exists", ErrorKind::DistributionAlreadyExists),
    ("access is denied", ErrorKind::PermissionDenied),
    ("e_accessdenied", ErrorKind::PermissionDenied),
    (
        "windows subsystem for linux has not been enabled",
        ErrorKind::WslNotInstalled,
    ),
    (
        "windows subsystem for linux is not installed",
        ErrorKind::WslNotInstalled,
    ),
    (
        "wsl_e_wsl_optional_component_required",
        ErrorKind::WslNotInstalled,
    ),
];

/// What went wrong, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFailure {
    /// The process could not be started.
    Spawn {
        io_kind: Option<io::ErrorKind>,
        message: String,
    },
    /// The process ran and exited non-zero.
    Exit {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// The process was killed after exceeding its deadline.
    Timeout { after: Duration },
    /// A download collaborator reported an errno-style code.
    Network { code: String, message: String },
    /// A download collaborator received an HTTP error status.
    Http { status: u16 },
    /// Rejected before spawn, including rate limiting.
    Validation(ValidationError),
}

impl From<ValidationError> for RawFailure {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ProcessError> for RawFailure {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { kind, message, .. } => Self::Spawn {
                io_kind: Some(kind),
                message,
            },
            ProcessError::TimedOut { after, .. } => Self::Timeout { after },
            ProcessError::Wait { message, .. } => Self::Spawn {
                io_kind: None,
                message,
            },
        }
    }
}

/// A failure mapped onto the taxonomy.
///
/// `cause` keeps the underlying diagnostic text for logs; it is never shown
/// verbatim except through `UnknownError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggested_action: Option<String>,
    pub cause: String,
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClassifiedError {}

impl From<ValidationError> for ClassifiedError {
    fn from(err: ValidationError) -> Self {
        classify(&RawFailure::Validation(err))
    }
}

/// Text ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub title: String,
    pub detail: String,
    pub suggested_action: Option<String>,
}

/// Match decoded `wsl.exe` output against [`STDERR_PATTERNS`].
#[must_use]
pub fn match_output(text: &str) -> Option<ErrorKind> {
    let lower = text.to_lowercase();
    STDERR_PATTERNS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, kind)| *kind)
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
}

fn is_enoent(io_kind: Option<io::ErrorKind>, message: &str) -> bool {
    io_kind == Some(io::ErrorKind::NotFound)
        || message.contains("ENOENT")
        || message.to_lowercase().contains("no such file")
}

fn suggested_action(kind: ErrorKind, retry_after: Option<Duration>) -> Option<String> {
    let text = match kind {
        ErrorKind::InvalidName => {
            "Use only letters, digits, '.', '_' and '-' (at most 64 characters)".to_string()
        }
        ErrorKind::PathTraversal => {
            "Choose a path inside the configured allowedRootPath".to_string()
        }
        ErrorKind::UnsupportedOperation => "Run `wslm --help` to see supported commands".to_string(),
        ErrorKind::RateLimited => {
            let secs = retry_after.map_or(1, |d| d.as_secs().max(1));
            format!("Wait {secs} seconds and retry")
        }
        ErrorKind::WslNotInstalled => "Install WSL2 via `wsl --install`".to_string(),
        ErrorKind::DistributionNotFound => {
            "Run `wslm list` to see installed distributions".to_string()
        }
        ErrorKind::DistributionAlreadyExists => {
            "Choose a different name or delete the existing distribution".to_string()
        }
        ErrorKind::OperationTimedOut => {
            "Retry, or raise the timeout with `wslm config set`".to_string()
        }
        ErrorKind::NetworkUnavailable => "Check your network connection and retry".to_string(),
        ErrorKind::PermissionDenied => {
            "Run from an elevated prompt or check file permissions".to_string()
        }
        ErrorKind::UnknownError => return None,
    };
    Some(text)
}

fn classified(kind: ErrorKind, message: impl Into<String>, cause: impl Into<String>) -> ClassifiedError {
    ClassifiedError {
        kind,
        message: message.into(),
        suggested_action: suggested_action(kind, None),
        cause: cause.into(),
    }
}

/// Map a raw failure onto the taxonomy. Pure and deterministic.
#[must_use]
pub fn classify(failure: &RawFailure) -> ClassifiedError {
    match failure {
        RawFailure::Validation(err) => {
            let retry_after = match err {
                ValidationError::RateLimited { retry_after, .. } => Some(*retry_after),
                _ => None,
            };
            ClassifiedError {
                kind: err.kind(),
                message: err.to_string(),
                suggested_action: suggested_action(err.kind(), retry_after),
                cause: format!("{err:?}"),
            }
        }
        RawFailure::Spawn { io_kind, message } => {
            if is_enoent(*io_kind, message) {
                classified(
                    ErrorKind::WslNotInstalled,
                    "wsl.exe could not be found",
                    message.clone(),
                )
            } else if *io_kind == Some(io::ErrorKind::PermissionDenied) {
                classified(
                    ErrorKind::PermissionDenied,
                    "wsl.exe could not be started: permission denied",
                    message.clone(),
                )
            } else {
                classified(ErrorKind::UnknownError, message.clone(), message.clone())
            }
        }
        RawFailure::Exit {
            code,
            stdout,
            stderr,
        } => {
            let stderr = normalize_output(stderr);
            let stdout = normalize_output(stdout);
            let kind = match_output(&stderr).or_else(|| match_output(&stdout));
            let text = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            let cause = match code {
                Some(c) => format!("exit code {c}: {text}"),
                None => format!("terminated by signal: {text}"),
            };
            match kind {
                Some(kind) => classified(kind, first_line(text), cause),
                None => {
                    let message = if text.is_empty() {
                        match code {
                            Some(c) => format!("wsl.exe exited with code {c}"),
                            None => "wsl.exe was terminated by a signal".to_string(),
                        }
                    } else {
                        text.to_string()
                    };
                    classified(ErrorKind::UnknownError, message, cause)
                }
            }
        }
        RawFailure::Timeout { after } => classified(
            ErrorKind::OperationTimedOut,
            format!("Operation timed out after {}s", after.as_secs()),
            format!("deadline of {}ms exceeded", after.as_millis()),
        ),
        RawFailure::Network { code, message } => {
            if NETWORK_CODES.contains(&code.as_str()) {
                classified(
                    ErrorKind::NetworkUnavailable,
                    format!("Network unavailable ({code})"),
                    format!("{code}: {message}"),
                )
            } else {
                classified(
                    ErrorKind::UnknownError,
                    format!("{code}: {message}"),
                    format!("{code}: {message}"),
                )
            }
        }
        RawFailure::Http { status } => {
            let kind = match status {
                500..=599 => ErrorKind::NetworkUnavailable,
                401 | 403 => ErrorKind::PermissionDenied,
                404 => ErrorKind::DistributionNotFound,
                _ => ErrorKind::UnknownError,
            };
            classified(
                kind,
                format!("Download failed with HTTP {status}"),
                format!("http status {status}"),
            )
        }
    }
}

fn title(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidName => "Invalid distribution name",
        ErrorKind::PathTraversal => "Path not allowed",
        ErrorKind::UnsupportedOperation => "Unsupported operation",
        ErrorKind::RateLimited => "Too many requests",
        ErrorKind::WslNotInstalled => "WSL is not installed",
        ErrorKind::DistributionNotFound => "Distribution not found",
        ErrorKind::DistributionAlreadyExists => "Distribution already exists",
        ErrorKind::OperationTimedOut => "Operation timed out",
        ErrorKind::NetworkUnavailable => "Network unavailable",
        ErrorKind::PermissionDenied => "Permission denied",
        ErrorKind::UnknownError => "Unexpected error",
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Render a classified error for the user.
///
/// Pre-spawn failures echo only what the user typed. Runtime failures get a
/// fixed sentence per kind, except `UnknownError`, which shows the first line
/// of the underlying message.
#[must_use]
pub fn to_user_message(err: &ClassifiedError) -> UserMessage {
    let detail = match err.kind {
        ErrorKind::InvalidName
        | ErrorKind::PathTraversal
        | ErrorKind::UnsupportedOperation
        | ErrorKind::RateLimited => err.message.clone(),
        ErrorKind::WslNotInstalled => {
            "The Windows Subsystem for Linux is not available on this machine.".to_string()
        }
        ErrorKind::DistributionNotFound => {
            "No distribution with that name is registered.".to_string()
        }
        ErrorKind::DistributionAlreadyExists => {
            "A distribution with that name is already registered.".to_string()
        }
        ErrorKind::OperationTimedOut => err.message.clone(),
        ErrorKind::NetworkUnavailable => "The download could not reach the server.".to_string(),
        ErrorKind::PermissionDenied => {
            "The operation was refused by the operating system.".to_string()
        }
        ErrorKind::UnknownError => truncate_chars(first_line(&err.message), UNKNOWN_DETAIL_MAX),
    };
    UserMessage {
        title: title(err.kind).to_string(),
        detail,
        suggested_action: err.suggested_action.clone(),
    }
}
