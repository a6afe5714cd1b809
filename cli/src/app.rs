//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output context and the configuration store. Each
//! command builds one `CommandExecutor` from the effective configuration.

use anyhow::{Context, Result};

use crate::application::ports::Confirmer;
use crate::application::services::executor::{CommandExecutor, ExecutorSettings};
use crate::domain::classify::{ClassifiedError, UserMessage, to_user_message};
use crate::domain::config::WslmConfig;
use crate::domain::security::SecurityValidator;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::LocalFs;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter, json};

/// Environment variable that skips confirmation prompts.
pub const YES_ENV: &str = "WSLM_YES";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `WSLM_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration persistence.
    pub config_store: YamlConfigStore,
    /// Filesystem adapter for hashing and directory creation.
    pub fs: LocalFs,
    /// When `true`, skip interactive prompts and confirm.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `WSLM_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var(YES_ENV).is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
            fs: LocalFs,
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for services; silent in JSON mode.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        if self.is_json() {
            TerminalReporter::silent(&self.output)
        } else {
            TerminalReporter::new(&self.output)
        }
    }

    /// Build the executor from the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or no allowed
    /// root can be determined.
    pub fn executor(&self) -> Result<CommandExecutor<TokioCommandRunner>> {
        let config = self.config_store.load_effective()?;
        executor_from_config(&config)
    }

    /// Print a failure in the current output mode.
    ///
    /// Classified errors keep their kind and suggested action; anything else
    /// is shown as a generic error with its context chain.
    pub fn report_error(&self, err: &anyhow::Error) {
        let (kind, msg) = describe_error(err);
        if self.is_json() {
            match json::format_error(kind, &msg) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("Error: {e}"),
            }
        } else {
            HumanRenderer::new(&self.output).render_error(&msg);
        }
    }
}

/// Build an executor for `config`, rooted at the home directory unless
/// `allowedRootPath` is set.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn executor_from_config(config: &WslmConfig) -> Result<CommandExecutor<TokioCommandRunner>> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    let settings = ExecutorSettings::from_config(config, &home.to_string_lossy());
    let security = SecurityValidator::new(config.rate_limit_policy());
    Ok(CommandExecutor::new(
        TokioCommandRunner::new(),
        security,
        settings,
    ))
}

/// Map any error onto the displayed message.
#[must_use]
pub fn describe_error(err: &anyhow::Error) -> (Option<wslm_common::ErrorKind>, UserMessage) {
    if let Some(classified) = err.downcast_ref::<ClassifiedError>() {
        return (Some(classified.kind), to_user_message(classified));
    }
    (
        None,
        UserMessage {
            title: "Error".to_string(),
            detail: format!("{err:#}"),
            suggested_action: None,
        },
    )
}

impl Confirmer for AppContext {
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `WSLM_YES`
    /// env), returns `true` immediately without prompting.
    fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.non_interactive {
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
