//! `wslm list`: show installed distributions.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::distributions;

/// Run `wslm list`.
///
/// # Errors
///
/// Returns the classified failure of `wsl --list --verbose`.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let exec = app.executor()?;
    let list = distributions::list(&exec).await?;
    app.renderer().render_list(&list)?;
    Ok(ExitCode::SUCCESS)
}
