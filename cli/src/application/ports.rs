//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`; never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::command::CommandSpec;
use crate::domain::config::WslmConfig;
use crate::domain::error::ProcessError;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Implementations spawn `spec.program()` with `spec.args()` as discrete
/// argv entries. They never go through a shell.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run to completion and capture stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Spawn` if the process cannot be started and
    /// `ProcessError::TimedOut` if it exceeds `timeout`. On timeout the child
    /// must be killed, not left orphaned. A non-zero exit is NOT an error.
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Output, ProcessError>;

    /// Run with inherited stdio and no deadline.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Spawn` or `ProcessError::Wait`.
    async fn run_interactive(&self, spec: &CommandSpec) -> Result<ExitStatus, ProcessError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Confirmation Port ─────────────────────────────────────────────────────────

/// Asks the user before an operation that discards or overwrites state.
pub trait Confirmer {
    /// Returns `Ok(true)` when the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<WslmConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &WslmConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the SHA-256 hash of a file as lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

/// Abstracts the few filesystem mutations services need.
pub trait LocalFs {
    /// Create `path` and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Remove `path` if it is an empty directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or not empty.
    fn remove_dir(&self, path: &Path) -> Result<()>;
}
