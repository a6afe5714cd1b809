//! `wslm import <name> <install-dir> <archive>`: register a distribution from
//! an exported archive.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use wslm_common::Operation;

use crate::app::AppContext;
use crate::application::services::distributions::{self, ImportRequest};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Name to register the distribution under
    pub name: String,
    /// Directory that will hold the virtual disk
    pub install_dir: String,
    /// Archive (.tar) to import
    pub archive: String,
    /// Refuse the import unless the archive has this SHA-256 digest
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,
}

/// Run `wslm import`.
///
/// # Errors
///
/// Returns an error if validation, digest verification or `wsl --import`
/// fails.
pub async fn run(app: &AppContext, args: &ImportArgs) -> Result<ExitCode> {
    let exec = app.executor()?;
    let request = ImportRequest {
        name: &args.name,
        install_dir: &args.install_dir,
        archive: &args.archive,
        expected_sha256: args.sha256.as_deref(),
    };
    let outcome = distributions::import(&exec, app, &app.fs, &app.reporter(), request).await?;
    super::finish_action(app, Operation::Import, &args.name, outcome, |out, done| {
        out.install_dir = Some(done.install_dir);
        out.archive = Some(args.archive.clone());
        out.sha256 = done.sha256;
    })
}
