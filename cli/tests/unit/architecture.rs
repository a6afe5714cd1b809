//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that process spawning stays in
//! one place and never goes through a shell.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-comment lines outside `#[cfg(test)]` blocks, with 1-based line numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            !in_test && !trimmed.starts_with("//") && !trimmed.starts_with('*')
        })
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

fn rel(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
        .replace('\\', "/")
}

/// Scan `dir` for any of `needles` in production code.
fn find(dir: &Path, needles: &[&str], skip: impl Fn(&str) -> bool) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = rel(&file);
        if skip(&rel) {
            continue;
        }
        for (lineno, line) in production_lines(&file) {
            for needle in needles {
                if line.contains(needle) {
                    violations.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
                }
            }
        }
    }
    violations
}

// ── No shell interpreters ────────────────────────────────────────────────────

#[test]
fn no_shell_invocation_anywhere() {
    let violations = find(
        &src_dir(),
        &[
            "\"sh\"",
            "\"bash\"",
            "\"-c\"",
            "\"cmd\"",
            "\"cmd.exe\"",
            "\"/C\"",
            "\"powershell\"",
            "sh -c",
            "cmd /C",
        ],
        |_| false,
    );
    assert!(
        violations.is_empty(),
        "Found shell invocation, pass an argv to the runner instead:\n{}",
        violations.join("\n")
    );
}

// ── Process spawning lives in infra ──────────────────────────────────────────

#[test]
fn no_command_new_outside_infra() {
    let violations = find(
        &src_dir(),
        &["Command::new(", "std::process::Command"],
        |rel| rel.contains("/infra/"),
    );
    assert!(
        violations.is_empty(),
        "Found process construction outside infra/, go through CommandRunner:\n{}",
        violations.join("\n")
    );
}

#[test]
fn tokio_command_runner_is_only_built_in_app() {
    let violations = find(&src_dir(), &["TokioCommandRunner::new"], |rel| {
        rel.contains("/infra/") || rel.ends_with("app.rs")
    });
    assert!(
        violations.is_empty(),
        "Found TokioCommandRunner::new outside infra/ and app.rs:\n{}",
        violations.join("\n")
    );
}

#[test]
fn services_are_generic_over_the_runner() {
    let services = src_dir().join("application").join("services");
    let violations: Vec<String> = find(&services, &["TokioCommandRunner", "YamlConfigStore"], |_| {
        false
    });
    assert!(
        violations.is_empty(),
        "Found concrete infra types in services, use port traits instead:\n{}",
        violations.join("\n")
    );
}

// ── Layer purity ─────────────────────────────────────────────────────────────

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let domain = src_dir().join("domain");
    let violations = find(
        &domain,
        &[
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
        ],
        |_| false,
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_does_not_import_infra_or_presentation() {
    let application = src_dir().join("application");
    let violations = find(
        &application,
        &["crate::infra", "crate::commands", "crate::output", "crate::app::"],
        |_| false,
    );
    assert!(
        violations.is_empty(),
        "application/ must depend only on domain/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let infra = src_dir().join("infra");
    let violations = find(&infra, &["crate::commands", "crate::output"], |_| false);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let infra = src_dir().join("infra");
    let violations = find(&infra, &["println!", "eprintln!"], |_| false);
    assert!(
        violations.is_empty(),
        "infra/ must not use println!/eprintln! outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

// ── Presentation ─────────────────────────────────────────────────────────────

#[test]
fn command_handlers_accept_app_context() {
    let commands = src_dir().join("commands");
    let mut violations = Vec::new();
    for file in collect_rs_files(&commands) {
        if file.file_name().and_then(|n| n.to_str()) == Some("mod.rs") {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        if !content.contains("fn run(app: &AppContext") {
            violations.push(rel(&file));
        }
    }
    assert!(
        violations.is_empty(),
        "Command handlers must take `app: &AppContext` first:\n{}",
        violations.join("\n")
    );
}
