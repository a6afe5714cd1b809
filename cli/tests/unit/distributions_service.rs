//! Unit tests for the distribution use-cases.
//!
//! Covers confirmation gating, digest handling and the argv each use-case
//! hands to the executor.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use wslm_cli::application::services::distributions::{
    self, Created, ImportRequest, Outcome,
};
use wslm_cli::domain::classify::ClassifiedError;
use wslm_cli::domain::security::{RateLimitPolicy, SecurityEventKind};
use wslm_common::{DistroState, ErrorKind, Operation};

use crate::helpers::{err_output, executor, executor_with_policy, ok_output, utf16le};
use crate::mocks::{self, FixedConfirmer, MockFs, MockRunner, RecordingReporter};

const DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

// ── list ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_parses_utf16_verbose_output() {
    let stdout = utf16le(
        "  NAME            STATE           VERSION\r\n\
         * Ubuntu-22.04    Running         2\r\n\
           Debian          Stopped         1\r\n",
    );
    let exec = executor(MockRunner::with_responses([Ok(ok_output(&stdout))]));
    let list = distributions::list(&exec).await.unwrap();

    assert_eq!(list.distributions.len(), 2);
    let ubuntu = &list.distributions[0];
    assert_eq!(ubuntu.name, "Ubuntu-22.04");
    assert_eq!(ubuntu.state, DistroState::Running);
    assert_eq!(ubuntu.version, Some(2));
    assert!(ubuntu.is_default);
    assert!(!list.distributions[1].is_default);
}

#[tokio::test]
async fn test_list_with_no_distributions_is_empty() {
    let exec = executor(MockRunner::with_responses([Ok(ok_output(&utf16le(
        "Windows Subsystem for Linux has no installed distributions.\r\n",
    )))]));
    let list = distributions::list(&exec).await.unwrap();
    assert!(list.distributions.is_empty());
}

// ── delete / terminate ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_declined_spawns_nothing() {
    let exec = executor(MockRunner::new());
    let confirmer = FixedConfirmer::no();
    let outcome = distributions::delete(&exec, &confirmer, "Ubuntu")
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(exec.runner().calls().is_empty());
    assert_eq!(confirmer.prompts().len(), 1);
    let events = exec.security().recent_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, SecurityEventKind::ConfirmationDeclined);
}

#[tokio::test]
async fn test_delete_confirmed_unregisters() {
    let exec = executor(MockRunner::new());
    let outcome = distributions::delete(&exec, &FixedConfirmer::yes(), "Ubuntu")
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Done(()));
    assert_eq!(exec.runner().calls()[0].args, vec!["--unregister", "Ubuntu"]);
}

#[tokio::test]
async fn test_delete_invalid_name_is_rejected_before_prompt() {
    let exec = executor(MockRunner::new());
    let confirmer = FixedConfirmer::yes();
    let err = distributions::delete(&exec, &confirmer, "a;b")
        .await
        .unwrap_err();

    let classified = err.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::InvalidName);
    assert!(confirmer.prompts().is_empty());
}

#[tokio::test]
async fn test_terminate_confirmed_terminates() {
    let exec = executor(MockRunner::new());
    distributions::terminate(&exec, &FixedConfirmer::yes(), "Debian")
        .await
        .unwrap();
    assert_eq!(exec.runner().calls()[0].args, vec!["--terminate", "Debian"]);
}

// ── set-default / run ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_default_needs_no_confirmation() {
    let exec = executor(MockRunner::new());
    distributions::set_default(&exec, "Debian").await.unwrap();
    assert_eq!(exec.runner().calls()[0].args, vec!["--set-default", "Debian"]);
}

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_imports_into_managed_dir() {
    let exec = executor(MockRunner::new());
    let fs = MockFs::with_digest(DIGEST);
    let reporter = RecordingReporter::default();
    let created = distributions::create(&exec, &fs, &reporter, "dev", "images/rootfs.tar")
        .await
        .unwrap();

    assert_eq!(
        created,
        Created {
            name: "dev".to_string(),
            install_dir: "/home/user/.wslm/distros/dev".to_string(),
        }
    );
    assert_eq!(
        fs.created(),
        vec![PathBuf::from("/home/user/.wslm/distros/dev")]
    );
    assert_eq!(
        exec.runner().calls()[0].args,
        vec![
            "--import",
            "dev",
            "/home/user/.wslm/distros/dev",
            "/home/user/images/rootfs.tar"
        ]
    );
    assert_eq!(reporter.events().last().unwrap(), "success: created dev");
    assert!(fs.removed().is_empty());
}

#[tokio::test]
async fn test_create_failure_removes_new_install_dir() {
    let stderr = utf16le("A distribution with the supplied name already exists.\r\n");
    let exec = executor(MockRunner::with_responses([Ok(err_output(1, &stderr))]));
    let fs = MockFs::with_digest(DIGEST);
    let err = distributions::create(
        &exec,
        &fs,
        &RecordingReporter::default(),
        "dev",
        "images/rootfs.tar",
    )
    .await
    .unwrap_err();

    let classified = err.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::DistributionAlreadyExists);
    assert_eq!(
        fs.removed(),
        vec![PathBuf::from("/home/user/.wslm/distros/dev")]
    );
}

#[tokio::test]
async fn test_create_rate_limited_removes_new_install_dir() {
    let exec = executor_with_policy(
        MockRunner::new(),
        RateLimitPolicy::default().with_override(Operation::Create, 1),
    );
    let fs = MockFs::with_digest(DIGEST);
    let reporter = RecordingReporter::default();
    distributions::create(&exec, &fs, &reporter, "dev", "images/rootfs.tar")
        .await
        .unwrap();
    let err = distributions::create(&exec, &fs, &reporter, "qa", "images/rootfs.tar")
        .await
        .unwrap_err();

    let classified = err.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::RateLimited);
    assert_eq!(exec.runner().calls().len(), 1);
    assert_eq!(
        fs.removed(),
        vec![PathBuf::from("/home/user/.wslm/distros/qa")]
    );
}

#[tokio::test]
async fn test_create_failure_keeps_preexisting_install_dir() {
    let exec = executor(MockRunner::with_responses([mocks::not_found()]));
    let fs = MockFs::with_digest(DIGEST).with_existing("/home/user/.wslm/distros/dev");
    let err = distributions::create(
        &exec,
        &fs,
        &RecordingReporter::default(),
        "dev",
        "images/rootfs.tar",
    )
    .await
    .unwrap_err();

    let classified = err.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::WslNotInstalled);
    assert!(fs.removed().is_empty());
}

#[tokio::test]
async fn test_create_rejects_rootfs_outside_root() {
    let exec = executor(MockRunner::new());
    let fs = MockFs::with_digest(DIGEST);
    let err = distributions::create(
        &exec,
        &fs,
        &RecordingReporter::default(),
        "dev",
        "/tmp/rootfs.tar",
    )
    .await
    .unwrap_err();

    let classified = err.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::PathTraversal);
    assert!(fs.created().is_empty());
    assert!(exec.runner().calls().is_empty());
}

// ── import ───────────────────────────────────────────────────────────────────

fn import_request(expected: Option<&str>) -> ImportRequest<'_> {
    ImportRequest {
        name: "dev",
        install_dir: "/home/user/wsl/dev",
        archive: "/home/user/backups/dev.tar",
        expected_sha256: expected,
    }
}

#[tokio::test]
async fn test_import_reports_verified_digest() {
    let exec = executor(MockRunner::new());
    let outcome = distributions::import(
        &exec,
        &FixedConfirmer::yes(),
        &MockFs::with_digest(DIGEST),
        &RecordingReporter::default(),
        import_request(Some(DIGEST)),
    )
    .await
    .unwrap();

    let Outcome::Done(imported) = outcome else {
        panic!("import was cancelled");
    };
    assert_eq!(imported.sha256.as_deref(), Some(DIGEST));
    assert_eq!(
        exec.runner().calls()[0].args,
        vec![
            "--import",
            "dev",
            "/home/user/wsl/dev",
            "/home/user/backups/dev.tar"
        ]
    );
}

#[tokio::test]
async fn test_import_without_expected_digest_skips_hashing() {
    let exec = executor(MockRunner::new());
    let reporter = RecordingReporter::default();
    let outcome = distributions::import(
        &exec,
        &FixedConfirmer::yes(),
        &MockFs::unreadable(),
        &reporter,
        import_request(None),
    )
    .await
    .unwrap();

    let Outcome::Done(imported) = outcome else {
        panic!("import was cancelled");
    };
    assert_eq!(imported.sha256, None);
    assert!(!reporter.events().iter().any(|e| e.contains("hashing")));
    assert_eq!(exec.runner().calls().len(), 1);
}

#[tokio::test]
async fn test_import_digest_comparison_ignores_case() {
    let exec = executor(MockRunner::new());
    let upper = DIGEST.to_ascii_uppercase();
    let outcome = distributions::import(
        &exec,
        &FixedConfirmer::yes(),
        &MockFs::with_digest(DIGEST),
        &RecordingReporter::default(),
        import_request(Some(upper.as_str())),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, Outcome::Done(_)));
}

#[tokio::test]
async fn test_import_digest_mismatch_spawns_nothing() {
    let exec = executor(MockRunner::new());
    let confirmer = FixedConfirmer::yes();
    let err = distributions::import(
        &exec,
        &confirmer,
        &MockFs::with_digest(DIGEST),
        &RecordingReporter::default(),
        import_request(Some("00")),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("SHA-256 mismatch"), "got: {err}");
    assert!(confirmer.prompts().is_empty());
    assert!(exec.runner().calls().is_empty());
}

#[tokio::test]
async fn test_import_declined_is_cancelled() {
    let exec = executor(MockRunner::new());
    let outcome = distributions::import(
        &exec,
        &FixedConfirmer::no(),
        &MockFs::with_digest(DIGEST),
        &RecordingReporter::default(),
        import_request(None),
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(exec.runner().calls().is_empty());
}

// ── export ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_export_reports_digest() {
    let exec = executor(MockRunner::new());
    let outcome = distributions::export(
        &exec,
        &FixedConfirmer::yes(),
        &MockFs::with_digest(DIGEST),
        &RecordingReporter::default(),
        "Debian",
        "backups/debian.tar",
    )
    .await
    .unwrap();

    let Outcome::Done(exported) = outcome else {
        panic!("export was cancelled");
    };
    assert_eq!(exported.archive, "/home/user/backups/debian.tar");
    assert_eq!(exported.sha256.as_deref(), Some(DIGEST));
}

#[tokio::test]
async fn test_export_hash_failure_is_only_a_warning() {
    let exec = executor(MockRunner::new());
    let reporter = RecordingReporter::default();
    let outcome = distributions::export(
        &exec,
        &FixedConfirmer::yes(),
        &MockFs::unreadable(),
        &reporter,
        "Debian",
        "backups/debian.tar",
    )
    .await
    .unwrap();

    let Outcome::Done(exported) = outcome else {
        panic!("export was cancelled");
    };
    assert_eq!(exported.sha256, None);
    assert!(
        reporter.events().iter().any(|e| e.starts_with("warn: ")),
        "events: {:?}",
        reporter.events()
    );
}
