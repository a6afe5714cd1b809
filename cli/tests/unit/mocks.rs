//! Shared mock infrastructure for unit tests.
//!
//! Provides a recording [`CommandRunner`] plus canned confirmers, reporters
//! and filesystem adapters so each test file doesn't have to re-define the
//! same boilerplate.

#![allow(dead_code, clippy::expect_used)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use wslm_cli::application::ports::{
    CommandRunner, Confirmer, FileHasher, LocalFs, ProgressReporter,
};
use wslm_cli::domain::command::CommandSpec;
use wslm_cli::domain::error::ProcessError;

use crate::helpers::{exit_status, ok_output};

// ── Runner ───────────────────────────────────────────────────────────────────

/// One recorded spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    /// `None` for interactive runs.
    pub timeout: Option<Duration>,
}

/// Records every spec it is asked to run and replays queued responses.
///
/// When the queue is empty each call succeeds with empty output.
#[derive(Default)]
pub struct MockRunner {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<Output, ProcessError>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses, consumed in order.
    pub fn with_responses(responses: impl IntoIterator<Item = Result<Output, ProcessError>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, spec: &CommandSpec, timeout: Option<Duration>) {
        self.calls.lock().expect("calls lock").push(Call {
            program: spec.program().to_string(),
            args: spec.args().to_vec(),
            timeout,
        });
    }

    fn next(&self) -> Result<Output, ProcessError> {
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Ok(ok_output(b"")))
    }
}

impl CommandRunner for MockRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Output, ProcessError> {
        self.record(spec, Some(timeout));
        self.next()
    }

    async fn run_interactive(&self, spec: &CommandSpec) -> Result<ExitStatus, ProcessError> {
        self.record(spec, None);
        self.next().map(|out| out.status)
    }
}

/// Response for a runner that hit its deadline.
pub fn timed_out(after: Duration) -> Result<Output, ProcessError> {
    Err(ProcessError::TimedOut {
        program: "wsl.exe".to_string(),
        after,
    })
}

/// Response for a missing `wsl.exe`.
pub fn not_found() -> Result<Output, ProcessError> {
    Err(ProcessError::Spawn {
        program: "wsl.exe".to_string(),
        kind: std::io::ErrorKind::NotFound,
        message: "No such file or directory (os error 2)".to_string(),
    })
}

/// Response for an interactive session that exited with `code`.
pub fn exited(code: i32) -> Result<Output, ProcessError> {
    Ok(Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: Vec::new(),
    })
}

// ── Confirmer ────────────────────────────────────────────────────────────────

/// Answers every prompt the same way and remembers the prompts.
pub struct FixedConfirmer {
    answer: bool,
    prompts: RefCell<Vec<String>>,
}

impl FixedConfirmer {
    pub fn yes() -> Self {
        Self {
            answer: true,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirmer for FixedConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer)
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

/// Collects progress events as `level: message` strings.
#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.borrow_mut().push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(format!("warn: {message}"));
    }
}

// ── Filesystem ───────────────────────────────────────────────────────────────

/// In-memory filesystem: hashing returns a fixed digest (or fails) and
/// created directories are recorded.
pub struct MockFs {
    digest: Option<String>,
    existing: RefCell<Vec<PathBuf>>,
    created: RefCell<Vec<PathBuf>>,
    removed: RefCell<Vec<PathBuf>>,
}

impl MockFs {
    fn with(digest: Option<String>) -> Self {
        Self {
            digest,
            existing: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
        }
    }

    pub fn with_digest(digest: &str) -> Self {
        Self::with(Some(digest.to_string()))
    }

    /// Every hash attempt fails.
    pub fn unreadable() -> Self {
        Self::with(None)
    }

    /// Treat `path` as already present before the test starts.
    pub fn with_existing(self, path: &str) -> Self {
        self.existing.borrow_mut().push(PathBuf::from(path));
        self
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.created.borrow().clone()
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.borrow().clone()
    }
}

impl FileHasher for MockFs {
    fn sha256_file(&self, path: &Path) -> Result<String> {
        match &self.digest {
            Some(d) => Ok(d.clone()),
            None => anyhow::bail!("cannot open {}", path.display()),
        }
    }
}

impl LocalFs for MockFs {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.created.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let present = self.existing.borrow().iter().any(|p| p == path)
            || self.created.borrow().iter().any(|p| p == path);
        present && !self.removed.borrow().iter().any(|p| p == path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.removed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
