//! Application service: distribution management use-cases.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! Every `wsl.exe` invocation goes through [`CommandExecutor`].

use std::path::Path;

use anyhow::{Context, Result};
use wslm_common::{ListOutput, Operation};

use crate::application::ports::{CommandRunner, Confirmer, FileHasher, LocalFs, ProgressReporter};
use crate::application::services::executor::CommandExecutor;
use crate::domain::classify::ClassifiedError;
use crate::domain::distro::{managed_install_dir, parse_list_verbose};
use crate::domain::security::{SecurityEvent, SecurityEventKind, SecurityValidator};
use crate::domain::validate::{validate_distribution_name, validate_file_path};

/// Result of a use-case that may be declined at the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub name: String,
    pub install_dir: String,
}

/// Inputs of [`import`].
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    pub name: &'a str,
    pub install_dir: &'a str,
    pub archive: &'a str,
    pub expected_sha256: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub name: String,
    pub install_dir: String,
    /// Set when the archive was checked against an expected digest.
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub name: String,
    pub archive: String,
    pub sha256: Option<String>,
}

/// Ask for confirmation when `operation` requires it.
///
/// A decline is recorded as a security event.
fn confirmed<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    confirmer: &impl Confirmer,
    operation: Operation,
    prompt: &str,
) -> Result<bool> {
    if !SecurityValidator::requires_confirmation(operation) {
        return Ok(true);
    }
    if confirmer.confirm(prompt)? {
        return Ok(true);
    }
    exec.security().record_security_event(SecurityEvent::new(
        operation,
        SecurityEventKind::ConfirmationDeclined,
        prompt,
    ));
    Ok(false)
}

/// List installed distributions.
///
/// # Errors
///
/// Returns the classified failure of `wsl --list --verbose`.
pub async fn list<R: CommandRunner>(exec: &CommandExecutor<R>) -> Result<ListOutput> {
    let out = exec.execute_with_defaults(Operation::List, &[]).await?;
    Ok(ListOutput {
        distributions: parse_list_verbose(&out.stdout),
    })
}

/// Register a new distribution from a root filesystem archive into a
/// managed install directory under the allowed root.
///
/// A directory created here is removed again when the import fails or is
/// rejected.
///
/// # Errors
///
/// Returns an error if validation fails, the install directory cannot be
/// created, or `wsl --import` fails.
pub async fn create<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    name: &str,
    rootfs: &str,
) -> Result<Created> {
    let root = &exec.settings().allowed_root;
    let validated = validate_distribution_name(name).map_err(ClassifiedError::from)?;
    validate_file_path(rootfs, root).map_err(ClassifiedError::from)?;
    let install_dir = managed_install_dir(root, &validated);
    let dir = Path::new(&install_dir);

    reporter.step(&format!("preparing {install_dir}"));
    let preexisting = fs.exists(dir);
    fs.create_dir_all(dir)
        .with_context(|| format!("failed to create {install_dir}"))?;

    reporter.step(&format!("importing {name}"));
    if let Err(err) = exec
        .execute_with_defaults(Operation::Create, &[name, &install_dir, rootfs])
        .await
    {
        if !preexisting && let Err(cleanup) = fs.remove_dir(dir) {
            tracing::debug!(error = %cleanup, dir = %install_dir, "install dir left in place");
        }
        return Err(err.into());
    }
    reporter.success(&format!("created {name}"));

    Ok(Created {
        name: name.to_string(),
        install_dir,
    })
}

/// Import an archive as a distribution installed at `req.install_dir`.
///
/// Only when `req.expected_sha256` is given is the archive hashed, before
/// the prompt, and the import refused on mismatch.
///
/// # Errors
///
/// Returns an error if validation fails, the digest does not match, or
/// `wsl --import` fails.
pub async fn import<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    confirmer: &impl Confirmer,
    hasher: &impl FileHasher,
    reporter: &impl ProgressReporter,
    req: ImportRequest<'_>,
) -> Result<Outcome<Imported>> {
    let ImportRequest {
        name,
        install_dir,
        archive,
        expected_sha256,
    } = req;
    let root = &exec.settings().allowed_root;
    validate_distribution_name(name).map_err(ClassifiedError::from)?;
    let dir = validate_file_path(install_dir, root).map_err(ClassifiedError::from)?;
    let tar = validate_file_path(archive, root).map_err(ClassifiedError::from)?;

    let sha256 = match expected_sha256 {
        Some(expected) => {
            reporter.step("hashing archive");
            let actual = hasher
                .sha256_file(Path::new(tar.as_str()))
                .with_context(|| format!("failed to read {tar}"))?;
            if !expected.eq_ignore_ascii_case(&actual) {
                anyhow::bail!("SHA-256 mismatch for {tar}: expected {expected}, got {actual}");
            }
            Some(actual)
        }
        None => None,
    };

    let prompt = format!("Import {tar} as '{name}' into {dir}?");
    if !confirmed(exec, confirmer, Operation::Import, &prompt)? {
        return Ok(Outcome::Cancelled);
    }

    reporter.step(&format!("importing {name}"));
    exec.execute_with_defaults(Operation::Import, &[name, dir.as_str(), tar.as_str()])
        .await?;
    reporter.success(&format!("imported {name}"));

    Ok(Outcome::Done(Imported {
        name: name.to_string(),
        install_dir: dir.to_string(),
        sha256,
    }))
}

/// Export a distribution to a TAR archive and report its digest.
///
/// # Errors
///
/// Returns an error if validation fails or `wsl --export` fails. A failure
/// to hash the written archive is only a warning.
pub async fn export<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    confirmer: &impl Confirmer,
    hasher: &impl FileHasher,
    reporter: &impl ProgressReporter,
    name: &str,
    archive: &str,
) -> Result<Outcome<Exported>> {
    validate_distribution_name(name).map_err(ClassifiedError::from)?;
    let tar =
        validate_file_path(archive, &exec.settings().allowed_root).map_err(ClassifiedError::from)?;

    let prompt = format!("Export '{name}' to {tar}? An existing file will be overwritten.");
    if !confirmed(exec, confirmer, Operation::Export, &prompt)? {
        return Ok(Outcome::Cancelled);
    }

    reporter.step(&format!("exporting {name}"));
    exec.execute_with_defaults(Operation::Export, &[name, tar.as_str()])
        .await?;

    let sha256 = match hasher.sha256_file(Path::new(tar.as_str())) {
        Ok(digest) => Some(digest),
        Err(err) => {
            tracing::warn!(error = %err, archive = %tar, "could not hash exported archive");
            reporter.warn(&format!("exported, but could not hash {tar}"));
            None
        }
    };
    reporter.success(&format!("exported {name}"));

    Ok(Outcome::Done(Exported {
        name: name.to_string(),
        archive: tar.to_string(),
        sha256,
    }))
}

/// Unregister a distribution, discarding its filesystem.
///
/// # Errors
///
/// Returns the classified failure of `wsl --unregister`.
pub async fn delete<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    confirmer: &impl Confirmer,
    name: &str,
) -> Result<Outcome<()>> {
    validate_distribution_name(name).map_err(ClassifiedError::from)?;
    let prompt = format!("Permanently delete '{name}' and all of its data?");
    if !confirmed(exec, confirmer, Operation::Delete, &prompt)? {
        return Ok(Outcome::Cancelled);
    }
    exec.execute_with_defaults(Operation::Delete, &[name]).await?;
    Ok(Outcome::Done(()))
}

/// Stop a running distribution.
///
/// # Errors
///
/// Returns the classified failure of `wsl --terminate`.
pub async fn terminate<R: CommandRunner>(
    exec: &CommandExecutor<R>,
    confirmer: &impl Confirmer,
    name: &str,
) -> Result<Outcome<()>> {
    validate_distribution_name(name).map_err(ClassifiedError::from)?;
    let prompt = format!("Terminate '{name}'? Unsaved work inside it will be lost.");
    if !confirmed(exec, confirmer, Operation::Terminate, &prompt)? {
        return Ok(Outcome::Cancelled);
    }
    exec.execute_with_defaults(Operation::Terminate, &[name])
        .await?;
    Ok(Outcome::Done(()))
}

/// Make `name` the default distribution.
///
/// # Errors
///
/// Returns the classified failure of `wsl --set-default`.
pub async fn set_default<R: CommandRunner>(exec: &CommandExecutor<R>, name: &str) -> Result<()> {
    exec.execute_with_defaults(Operation::SetDefault, &[name])
        .await?;
    Ok(())
}

/// Open an interactive shell in `name`. Returns the shell's exit code.
///
/// # Errors
///
/// Returns the classified failure when the session cannot be started.
pub async fn run<R: CommandRunner>(exec: &CommandExecutor<R>, name: &str) -> Result<Option<i32>> {
    Ok(exec.execute_interactive(Operation::Run, &[name]).await?)
}
