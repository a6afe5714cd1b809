//! `wslm delete <name>`: unregister a distribution and discard its data.

use std::process::ExitCode;

use anyhow::Result;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions;
use crate::commands::NameArgs;

/// Run `wslm delete`.
///
/// # Errors
///
/// Returns an error if the name is invalid or `wsl --unregister` fails.
pub async fn run(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let outcome = distributions::delete(&exec, app, &args.name).await?;
    super::finish_action(app, Operation::Delete, &args.name, outcome, |_, ()| {})
}
