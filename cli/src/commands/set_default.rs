//! `wslm set-default <name>`

use std::process::ExitCode;

use anyhow::Result;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions::{self, Outcome};
use crate::commands::NameArgs;

/// Run `wslm set-default`.
///
/// # Errors
///
/// Returns an error if the name is invalid or `wsl --set-default` fails.
pub async fn run(app: &AppContext, args: &NameArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    distributions::set_default(&exec, &args.name).await?;
    super::finish_action(
        app,
        Operation::SetDefault,
        &args.name,
        Outcome::Done(()),
        |_, ()| {},
    )
}
