//! `wslm run <name>`: open an interactive shell in a distribution.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::distributions;
use crate::commands::NameArgs;

/// Run `wslm run`. The process exits with the shell's exit code.
///
/// # Errors
///
/// Returns an error if the name is invalid or the session cannot start.
pub async fn run(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let code = distributions::run(&exec, &args.name).await?;
    // Killed by a signal: no code to forward.
    let code = code.unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
