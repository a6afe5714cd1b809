//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY, `step()` drives a single spinner that `success()` finishes.
/// Otherwise each event is one line: `→`, `✓` or `!`. Nothing is printed
/// when the reporter is silent (`--quiet` or `--json`).
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            silent: ctx.quiet,
            spinner: RefCell::new(None),
        }
    }

    /// A reporter that prints nothing, for JSON mode.
    #[must_use]
    pub fn silent(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            silent: true,
            spinner: RefCell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.silent {
            return;
        }
        if !self.ctx.show_progress() {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
            return;
        }
        let mut spinner = self.spinner.borrow_mut();
        match spinner.as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => *spinner = Some(progress::spinner(message)),
        }
    }

    fn success(&self, message: &str) {
        if self.silent {
            return;
        }
        match self.spinner.borrow_mut().take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => println!("  {} {message}", "✓".style(self.ctx.styles.success)),
        }
    }

    fn warn(&self, message: &str) {
        if self.silent {
            return;
        }
        let line = format!("  {} {message}", "!".style(self.ctx.styles.warning));
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.get_mut().take() {
            pb.finish_and_clear();
        }
    }
}
