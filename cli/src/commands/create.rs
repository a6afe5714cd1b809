//! `wslm create <name> <rootfs>`: register a new distribution in a managed
//! install directory.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions::{self, Outcome};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Name of the new distribution
    pub name: String,
    /// Root filesystem archive (.tar) under the allowed root
    pub rootfs: String,
}

/// Run `wslm create`.
///
/// # Errors
///
/// Returns an error if validation, directory creation or `wsl --import`
/// fails.
pub async fn run(app: &AppContext, args: &CreateArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let created = distributions::create(
        &exec,
        &app.fs,
        &app.reporter(),
        &args.name,
        &args.rootfs,
    )
    .await?;
    super::finish_action(
        app,
        Operation::Create,
        &args.name,
        Outcome::Done(created),
        |out, created| {
            out.install_dir = Some(created.install_dir);
            out.archive = Some(args.rootfs.clone());
        },
    )
}
