//! Shared test helpers: output constructors and executor builders.

#![allow(dead_code)]

use std::process::{ExitStatus, Output};
use std::time::Duration;

use wslm_cli::application::services::executor::{CommandExecutor, ExecutorSettings};
use wslm_cli::domain::security::{RateLimitPolicy, SecurityValidator};

use crate::mocks::MockRunner;

/// Allowed root used by every executor built here.
pub const ROOT: &str = "/home/user";

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// Encode `text` the way `wsl.exe` writes to a pipe: UTF-16LE with a BOM.
pub fn utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

// ── Executor builders ────────────────────────────────────────────────────────

pub fn settings() -> ExecutorSettings {
    ExecutorSettings {
        allowed_root: ROOT.to_string(),
        wsl_executable: "wsl.exe".to_string(),
        command_timeout: Duration::from_secs(30),
        import_export_timeout: Duration::from_secs(300),
    }
}

pub fn executor(runner: MockRunner) -> CommandExecutor<MockRunner> {
    executor_with_policy(runner, RateLimitPolicy::default())
}

pub fn executor_with_policy(
    runner: MockRunner,
    policy: RateLimitPolicy,
) -> CommandExecutor<MockRunner> {
    CommandExecutor::new(runner, SecurityValidator::new(policy), settings())
}
