//! Application service: the single path from a requested operation to a
//! spawned `wsl.exe`.
//!
//! Every call moves one way through
//! `Received → Validating → RateChecking → Building → Spawning → Running`
//! and ends in `Rejected`, `Succeeded`, `Failed` or `TimedOut`. Validation and
//! rate limiting happen before anything is spawned and are never retried.

use std::time::Duration;

use wslm_common::{ErrorKind, Operation};

use crate::application::ports::CommandRunner;
use crate::domain::classify::{ClassifiedError, RawFailure, classify};
use crate::domain::command::{CommandSpec, arg_roles, build};
use crate::domain::config::WslmConfig;
use crate::domain::encoding::normalize_output;
use crate::domain::error::ValidationError;
use crate::domain::security::{SecurityEvent, SecurityEventKind, SecurityValidator};
use crate::domain::validate::{
    ArgRole, ValidatedArgument, validate_distribution_name, validate_file_path,
};

/// Extra attempts allowed for read-only operations.
pub const MAX_READ_ONLY_RETRIES: u32 = 1;

// ── Stages ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    Validating,
    RateChecking,
    Building,
    Spawning,
    Running,
    Rejected,
    Succeeded,
    Failed,
    TimedOut,
}

impl Stage {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Succeeded | Self::Failed | Self::TimedOut
        )
    }

    /// Whether `next` may follow `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Validating | Self::RateChecking | Self::Building, Self::Rejected) => true,
            (Self::Running, Self::Succeeded | Self::Failed | Self::TimedOut) => true,
            (Self::Spawning, Self::Failed | Self::TimedOut) => true,
            // A retry re-enters Spawning after a failed attempt.
            (Self::Failed | Self::TimedOut, Self::Spawning) => true,
            _ => !self.is_terminal() && !next.is_terminal() && next > self,
        }
    }
}

/// Records and traces the stages of one call.
#[derive(Debug)]
struct StageTracker {
    operation: Operation,
    current: Stage,
}

impl StageTracker {
    fn new(operation: Operation) -> Self {
        tracing::debug!(operation = %operation, stage = ?Stage::Received, "executor stage");
        Self {
            operation,
            current: Stage::Received,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.current.can_advance_to(next),
            "illegal stage transition {:?} -> {next:?}",
            self.current
        );
        tracing::debug!(
            operation = %self.operation,
            from = ?self.current,
            stage = ?next,
            "executor stage"
        );
        self.current = next;
    }
}

// ── Settings and output ──────────────────────────────────────────────────────

/// Executor knobs derived from [`WslmConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub allowed_root: String,
    pub wsl_executable: String,
    pub command_timeout: Duration,
    pub import_export_timeout: Duration,
}

impl ExecutorSettings {
    /// `home` is used when the config has no `allowedRootPath`.
    #[must_use]
    pub fn from_config(config: &WslmConfig, home: &str) -> Self {
        Self {
            allowed_root: config
                .allowed_root_path
                .clone()
                .unwrap_or_else(|| home.to_string()),
            wsl_executable: config.wsl_executable.clone(),
            command_timeout: config.timeout_for(Operation::List),
            import_export_timeout: config.timeout_for(Operation::Import),
        }
    }

    #[must_use]
    pub fn timeout_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create | Operation::Import | Operation::Export => {
                self.import_export_timeout
            }
            _ => self.command_timeout,
        }
    }
}

/// Captured result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub operation: Operation,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub attempts: u32,
}

// ── Executor ─────────────────────────────────────────────────────────────────

/// Orchestrates validation, rate limiting, argv construction and the runner.
pub struct CommandExecutor<R> {
    runner: R,
    security: SecurityValidator,
    settings: ExecutorSettings,
}

impl<R: CommandRunner> CommandExecutor<R> {
    #[must_use]
    pub fn new(runner: R, security: SecurityValidator, settings: ExecutorSettings) -> Self {
        Self {
            runner,
            security,
            settings,
        }
    }

    #[must_use]
    pub fn security(&self) -> &SecurityValidator {
        &self.security
    }

    #[must_use]
    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Validate, rate-check and run `operation`, killing it after `timeout`.
    ///
    /// `raw_args` are positional in the order of [`arg_roles`].
    ///
    /// # Errors
    ///
    /// Returns the classified failure. Pre-spawn kinds (`InvalidName`,
    /// `PathTraversal`, `UnsupportedOperation`, `RateLimited`) guarantee that
    /// nothing was spawned.
    pub async fn execute(
        &self,
        operation: Operation,
        raw_args: &[&str],
        timeout: Duration,
    ) -> Result<ExecOutput, ClassifiedError> {
        let mut stages = StageTracker::new(operation);
        let spec = self.prepare(operation, raw_args, &mut stages)?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.run_once(operation, &spec, timeout, &mut stages).await {
                Ok(mut out) => {
                    out.attempts = attempts;
                    return Ok(out);
                }
                Err(err) if should_retry(operation, &err, attempts) => {
                    tracing::info!(
                        operation = %operation,
                        attempt = attempts,
                        kind = %err.kind,
                        "retrying read-only operation"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// [`execute`](Self::execute) with the configured deadline for
    /// `operation`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_defaults(
        &self,
        operation: Operation,
        raw_args: &[&str],
    ) -> Result<ExecOutput, ClassifiedError> {
        self.execute(operation, raw_args, self.settings.timeout_for(operation))
            .await
    }

    /// Run with the terminal attached and no deadline. Returns the exit code
    /// of the child.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when validation, rate limiting or the
    /// spawn itself fails.
    pub async fn execute_interactive(
        &self,
        operation: Operation,
        raw_args: &[&str],
    ) -> Result<Option<i32>, ClassifiedError> {
        let mut stages = StageTracker::new(operation);
        let spec = self.prepare(operation, raw_args, &mut stages)?;

        stages.advance(Stage::Spawning);
        tracing::info!(command = %spec, "spawning interactive");
        match self.runner.run_interactive(&spec).await {
            Ok(status) => {
                stages.advance(Stage::Running);
                stages.advance(Stage::Succeeded);
                self.record(
                    operation,
                    SecurityEventKind::Executed,
                    format!("interactive session exited with {status}"),
                );
                Ok(status.code())
            }
            Err(err) => {
                stages.advance(Stage::Failed);
                let classified = classify(&RawFailure::from(err));
                self.record(operation, SecurityEventKind::Failed, classified.cause.clone());
                Err(classified)
            }
        }
    }

    fn prepare(
        &self,
        operation: Operation,
        raw_args: &[&str],
        stages: &mut StageTracker,
    ) -> Result<CommandSpec, ClassifiedError> {
        stages.advance(Stage::Validating);
        let validated = self.validate_args(operation, raw_args).map_err(|err| {
            stages.advance(Stage::Rejected);
            self.reject(operation, SecurityEventKind::ValidationRejected, err)
        })?;

        stages.advance(Stage::RateChecking);
        self.security.check_rate_limit(operation).map_err(|err| {
            stages.advance(Stage::Rejected);
            self.reject(operation, SecurityEventKind::RateLimited, err)
        })?;

        stages.advance(Stage::Building);
        let spec = build(operation, &validated).map_err(|err| {
            stages.advance(Stage::Rejected);
            self.reject(operation, SecurityEventKind::ValidationRejected, err)
        })?;
        Ok(spec.with_program(self.settings.wsl_executable.clone()))
    }

    fn validate_args(
        &self,
        operation: Operation,
        raw_args: &[&str],
    ) -> Result<Vec<ValidatedArgument>, ValidationError> {
        let roles = arg_roles(operation);
        if roles.len() != raw_args.len() {
            return Err(ValidationError::UnsupportedOperation {
                operation,
                reason: format!(
                    "expected {} argument(s), got {}",
                    roles.len(),
                    raw_args.len()
                ),
            });
        }
        roles
            .into_iter()
            .zip(raw_args)
            .map(|(role, raw)| match role {
                ArgRole::DistributionName => validate_distribution_name(raw),
                ArgRole::FilePath => validate_file_path(raw, &self.settings.allowed_root),
            })
            .collect()
    }

    async fn run_once(
        &self,
        operation: Operation,
        spec: &CommandSpec,
        timeout: Duration,
        stages: &mut StageTracker,
    ) -> Result<ExecOutput, ClassifiedError> {
        stages.advance(Stage::Spawning);
        tracing::info!(
            command = %spec,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "spawning"
        );

        let output = match self.runner.run(spec, timeout).await {
            Ok(output) => output,
            Err(err) => {
                let classified = classify(&RawFailure::from(err));
                stages.advance(if classified.kind == ErrorKind::OperationTimedOut {
                    Stage::TimedOut
                } else {
                    Stage::Failed
                });
                self.record(operation, SecurityEventKind::Failed, classified.cause.clone());
                return Err(classified);
            }
        };

        stages.advance(Stage::Running);
        if output.status.success() {
            stages.advance(Stage::Succeeded);
            self.record(operation, SecurityEventKind::Executed, spec.to_string());
            return Ok(ExecOutput {
                operation,
                stdout: normalize_output(&output.stdout),
                stderr: normalize_output(&output.stderr),
                exit_code: output.status.code(),
                attempts: 1,
            });
        }

        stages.advance(Stage::Failed);
        let classified = classify(&RawFailure::Exit {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        });
        tracing::debug!(cause = %classified.cause, kind = %classified.kind, "command failed");
        self.record(operation, SecurityEventKind::Failed, classified.cause.clone());
        Err(classified)
    }

    fn reject(
        &self,
        operation: Operation,
        kind: SecurityEventKind,
        err: ValidationError,
    ) -> ClassifiedError {
        self.record(operation, kind, err.to_string());
        ClassifiedError::from(err)
    }

    fn record(&self, operation: Operation, kind: SecurityEventKind, detail: String) {
        self.security
            .record_security_event(SecurityEvent::new(operation, kind, detail));
    }
}

fn should_retry(operation: Operation, err: &ClassifiedError, attempts: u32) -> bool {
    operation.is_read_only()
        && attempts <= MAX_READ_ONLY_RETRIES
        && matches!(
            err.kind,
            ErrorKind::OperationTimedOut | ErrorKind::UnknownError
        )
}
