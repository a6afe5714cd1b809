//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Manage WSL distributions without ever going through a shell
#[derive(Parser)]
#[command(
    name = "wslm",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log executor activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List installed distributions
    List,

    /// Create a distribution from a root filesystem archive
    Create(commands::create::CreateArgs),

    /// Unregister a distribution and delete its data
    Delete(commands::NameArgs),

    /// Import a distribution from an archive
    Import(commands::import::ImportArgs),

    /// Export a distribution to an archive
    Export(commands::export::ExportArgs),

    /// Open a shell in a distribution
    Run(commands::NameArgs),

    /// Make a distribution the default
    SetDefault(commands::NameArgs),

    /// Stop a running distribution
    Terminate(commands::NameArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Build the application context from the global flags.
    #[must_use]
    pub fn app_context(&self) -> AppContext {
        AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            behaviour: BehaviourFlags { yes: self.yes },
        })
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails. WSL failures carry a
    /// `ClassifiedError` that callers can downcast to.
    pub async fn run(self, app: &AppContext) -> Result<ExitCode> {
        match self.command {
            Command::List => commands::list::run(app).await,
            Command::Create(args) => commands::create::run(app, &args).await,
            Command::Delete(args) => commands::delete::run(app, &args).await,
            Command::Import(args) => commands::import::run(app, &args).await,
            Command::Export(args) => commands::export::run(app, &args).await,
            Command::Run(args) => commands::run::run(app, &args).await,
            Command::SetDefault(args) => commands::set_default::run(app, &args).await,
            Command::Terminate(args) => commands::terminate::run(app, &args).await,
            Command::Config(cmd) => commands::config::run(app, cmd),
            Command::Version => commands::version::run(app),
        }
    }
}
