//! `wslm terminate <name>`: stop a running distribution.

use std::process::ExitCode;

use anyhow::Result;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions;
use crate::commands::NameArgs;

/// Run `wslm terminate`.
///
/// # Errors
///
/// Returns an error if the name is invalid or `wsl --terminate` fails.
pub async fn run(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let outcome = distributions::terminate(&exec, app, &args.name).await?;
    super::finish_action(app, Operation::Terminate, &args.name, outcome, |_, ()| {})
}
