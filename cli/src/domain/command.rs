//! Argument-vector construction for `wsl.exe`.
//!
//! Every token of a [`CommandSpec`] is either a literal flag from
//! [`COMMAND_TABLE`] or a [`ValidatedArgument`]. There is no way to build a
//! spec from a bare string.

use std::fmt;

use wslm_common::Operation;

use crate::domain::error::ValidationError;
use crate::domain::validate::{ArgRole, ValidatedArgument};

/// Default executable name.
pub const WSL_EXE: &str = "wsl.exe";

/// One position in an argv template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Flag(&'static str),
    Slot(ArgRole),
}

use ArgRole::{DistributionName as NAME, FilePath as PATH};
use Token::{Flag, Slot};

/// Static argv template per operation.
///
/// Create and Import share the `--import` form: Create picks a managed
/// install directory, Import takes one from the caller.
pub const COMMAND_TABLE: &[(Operation, &[Token])] = &[
    (Operation::List, &[Flag("--list"), Flag("--verbose")]),
    (
        Operation::Create,
        &[Flag("--import"), Slot(NAME), Slot(PATH), Slot(PATH)],
    ),
    (
        Operation::Import,
        &[Flag("--import"), Slot(NAME), Slot(PATH), Slot(PATH)],
    ),
    (Operation::Export, &[Flag("--export"), Slot(NAME), Slot(PATH)]),
    (Operation::Delete, &[Flag("--unregister"), Slot(NAME)]),
    (Operation::Run, &[Flag("--distribution"), Slot(NAME)]),
    (Operation::SetDefault, &[Flag("--set-default"), Slot(NAME)]),
    (Operation::Terminate, &[Flag("--terminate"), Slot(NAME)]),
];

fn template(operation: Operation) -> Option<&'static [Token]> {
    COMMAND_TABLE
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, tokens)| *tokens)
}

/// Roles of the argument slots for `operation`, in order.
///
/// Callers use this to decide which validator each raw input goes through.
#[must_use]
pub fn arg_roles(operation: Operation) -> Vec<ArgRole> {
    template(operation)
        .unwrap_or_default()
        .iter()
        .filter_map(|t| match t {
            Token::Slot(role) => Some(*role),
            Token::Flag(_) => None,
        })
        .collect()
}

/// An executable plus its discrete arguments. Never a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Only the builder and in-crate tests construct specs.
    pub(crate) fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Point the command at a different executable (e.g. a full path to
    /// `wsl.exe`). The argument vector is unchanged.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Debug rendering for logs only; never fed back to a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg:?}")?;
        }
        Ok(())
    }
}

/// Build the argv for `operation` from validated arguments.
///
/// # Errors
///
/// Returns `ValidationError::UnsupportedOperation` when the operation has no
/// template, or when the number or roles of `args` do not match it.
pub fn build(
    operation: Operation,
    args: &[ValidatedArgument],
) -> Result<CommandSpec, ValidationError> {
    let unsupported = |reason: String| ValidationError::UnsupportedOperation { operation, reason };

    let tokens = template(operation).ok_or_else(|| unsupported("no command template".into()))?;

    let expected = tokens
        .iter()
        .filter(|t| matches!(t, Token::Slot(_)))
        .count();
    if args.len() != expected {
        return Err(unsupported(format!(
            "expected {expected} argument(s), got {}",
            args.len()
        )));
    }

    let mut supplied = args.iter();
    let mut argv = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Flag(flag) => argv.push((*flag).to_string()),
            Token::Slot(role) => {
                let Some(arg) = supplied.next() else {
                    return Err(unsupported("argument list ended early".into()));
                };
                if arg.role() != *role {
                    return Err(unsupported(format!(
                        "argument {} must be a {role}, got a {}",
                        argv.len(),
                        arg.role()
                    )));
                }
                argv.push(arg.as_str().to_string());
            }
        }
    }

    Ok(CommandSpec::new(WSL_EXE, argv))
}
