//! Command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod run;
pub mod set_default;
pub mod terminate;
pub mod version;

use clap::Args;

use std::process::ExitCode;

use wslm_common::{ActionOutput, ActionStatus, Operation};

use crate::app::AppContext;
use crate::application::services::distributions::Outcome;

/// Arguments shared by commands that take only a distribution name.
#[derive(Args)]
pub struct NameArgs {
    /// Distribution name
    pub name: String,
}

/// Render a confirmable action and map it to an exit code.
///
/// `fill` adds operation-specific fields to the output of a completed action.
pub(crate) fn finish_action<T>(
    app: &AppContext,
    operation: Operation,
    name: &str,
    outcome: Outcome<T>,
    fill: impl FnOnce(&mut ActionOutput, T),
) -> anyhow::Result<ExitCode> {
    let out = match outcome {
        Outcome::Done(value) => {
            let mut out = ActionOutput::new(operation, name, ActionStatus::Done);
            fill(&mut out, value);
            out
        }
        Outcome::Cancelled => ActionOutput::new(operation, name, ActionStatus::Cancelled),
    };
    app.renderer().render_action(&out)?;
    Ok(ExitCode::SUCCESS)
}
