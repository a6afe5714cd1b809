//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;
use wslm_common::{ActionOutput, ActionStatus, DistroState, ListOutput, Operation};

use crate::domain::classify::UserMessage;
use crate::domain::config::WslmConfig;
use crate::infra::config::{CONFIG_ENV, WSL_EXE_ENV};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("wslm {version}");
    }

    /// Render installed distributions as a table.
    pub fn render_list(&self, list: &ListOutput) {
        if list.distributions.is_empty() {
            if !self.ctx.quiet {
                println!("No distributions installed. Create one: wslm create <name> <rootfs.tar>");
            }
            return;
        }

        println!(
            "  {}",
            format!("  {:<28} {:<14} {}", "NAME", "STATE", "VERSION").style(self.ctx.styles.dim)
        );
        for distro in &list.distributions {
            let marker = if distro.is_default { "*" } else { " " };
            let version = distro.version.map_or_else(|| "-".to_string(), |v| v.to_string());
            let state = format!("{:<14}", distro.state.as_str());
            let state = if distro.state == DistroState::Running {
                state.style(self.ctx.styles.running).to_string()
            } else {
                state
            };
            println!("  {marker} {:<28} {state} {version}", distro.name);
        }
    }

    /// Render the outcome of a mutating command.
    pub fn render_action(&self, out: &ActionOutput) {
        if out.status == ActionStatus::Cancelled {
            if !self.ctx.quiet {
                println!("Cancelled.");
            }
            return;
        }
        let verb = match out.operation {
            Operation::Create => "Created",
            Operation::Import => "Imported",
            Operation::Export => "Exported",
            Operation::Delete => "Deleted",
            Operation::SetDefault => "Default set to",
            Operation::Terminate => "Terminated",
            Operation::List | Operation::Run => "Ran",
        };
        self.ctx.success(&format!("{verb} {}", out.distribution));
        if let Some(dir) = &out.install_dir {
            self.ctx.kv("Install directory:", dir);
        }
        if let Some(archive) = &out.archive {
            self.ctx.kv("Archive:", archive);
        }
        if let Some(sha) = &out.sha256 {
            self.ctx.kv("SHA-256:", sha);
        }
    }

    /// Render the current wslm configuration.
    pub fn render_config(&self, config: &WslmConfig, path: &Path) {
        let root = config
            .allowed_root_path
            .clone()
            .unwrap_or_else(|| "(home directory)".to_string());

        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<24} {}", "rateLimitPerMinute:", config.rate_limit_per_minute);
        println!("  {:<24} {}", "importExportTimeoutMs:", config.import_export_timeout_ms);
        println!("  {:<24} {}", "commandTimeoutMs:", config.command_timeout_ms);
        println!("  {:<24} {root}", "allowedRootPath:");
        println!("  {:<24} {}", "wslExecutable:", config.wsl_executable);
        for (op, limit) in &config.rate_limits {
            println!("  {:<24} {limit}", format!("rateLimits.{op}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [CONFIG_ENV, WSL_EXE_ENV, "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }

    /// Render a failure on stderr. Never suppressed by `--quiet`.
    pub fn render_error(&self, msg: &UserMessage) {
        self.ctx.error(&format!(
            "{}: {}",
            msg.title.style(self.ctx.styles.bold),
            msg.detail
        ));
        if let Some(action) = &msg.suggested_action {
            eprintln!("    {} {action}", "→".style(self.ctx.styles.info));
        }
    }
}
