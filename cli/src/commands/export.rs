//! `wslm export <name> <archive>`: write a distribution to a TAR archive.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Distribution to export
    pub name: String,
    /// Destination archive (.tar) under the allowed root
    pub archive: String,
}

/// Run `wslm export`.
///
/// # Errors
///
/// Returns an error if validation or `wsl --export` fails.
pub async fn run(app: &AppContext, args: &ExportArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let outcome =
        distributions::export(&exec, app, &app.fs, &app.reporter(), &args.name, &args.archive)
            .await?;
    super::finish_action(app, Operation::Export, &args.name, outcome, |out, done| {
        out.archive = Some(done.archive);
        out.sha256 = done.sha256;
    })
}
