//! wslm: safe command-line front end for `wsl.exe`

use std::process::ExitCode;

use clap::Parser;

use wslm_cli::cli::Cli;
use wslm_cli::infra::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Error: {e}");
    }
    let app = cli.app_context();
    match cli.run(&app).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            app.report_error(&e);
            ExitCode::FAILURE
        }
    }
}
