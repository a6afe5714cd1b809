//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;
use crate::domain::command::CommandSpec;
use crate::domain::error::ProcessError;

/// Production `CommandRunner`: uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires; the future is dropped but the
/// OS process keeps running. This implementation uses `tokio::select!` with
/// explicit `child.kill()` to guarantee the process is terminated.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn command(spec: &CommandSpec) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(spec.program());
    cmd.args(spec.args()).kill_on_drop(true);
    cmd
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<Output, ProcessError> {
        let program = spec.program();
        let mut child = command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProcessError::spawn(program, &e))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                let status = status.map_err(|e| ProcessError::Wait {
                    program: program.to_string(),
                    message: e.to_string(),
                })?;
                Ok::<_, ProcessError>(Output { status, stdout, stderr })
            } => result,
            () = tokio::time::sleep(timeout) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(program, error = %e, "failed to kill timed-out child");
                }
                Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    after: timeout,
                })
            }
        }
    }

    async fn run_interactive(&self, spec: &CommandSpec) -> Result<ExitStatus, ProcessError> {
        let program = spec.program();
        let mut child = command(spec)
            .spawn()
            .map_err(|e| ProcessError::spawn(program, &e))?;

        child.wait().await.map_err(|e| ProcessError::Wait {
            program: program.to_string(),
            message: e.to_string(),
        })
    }
}
