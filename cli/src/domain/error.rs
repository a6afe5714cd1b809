//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::io;
use std::time::Duration;

use thiserror::Error;
use wslm_common::{ErrorKind, Operation};

// ── Validation errors ─────────────────────────────────────────────────────────

/// Failures detected before any process is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid distribution name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Path '{path}' is outside the allowed root: {reason}")]
    PathTraversal { path: String, reason: String },

    #[error("Unsupported operation '{operation}': {reason}")]
    UnsupportedOperation { operation: Operation, reason: String },

    #[error("Rate limit exceeded for '{operation}'. Retry in {}s.", retry_after.as_secs().max(1))]
    RateLimited {
        operation: Operation,
        retry_after: Duration,
    },
}

impl ValidationError {
    /// The taxonomy kind this failure maps to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
        }
    }
}

// ── Process errors ───────────────────────────────────────────────────────────

/// Failures of the process boundary itself, as reported by a command runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        program: String,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("{program} timed out after {}s", after.as_secs())]
    TimedOut { program: String, after: Duration },

    #[error("failed waiting for {program}: {message}")]
    Wait { program: String, message: String },
}

impl ProcessError {
    /// Capture an I/O error raised while starting `program`.
    #[must_use]
    pub fn spawn(program: &str, err: &io::Error) -> Self {
        Self::Spawn {
            program: program.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nExpected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
