//! Input validation for every string that can reach a `wsl.exe` argv.
//!
//! `ValidatedArgument` can only be constructed here. The command builder
//! accepts nothing else, so an unvalidated string cannot be turned into a
//! process argument.
//!
//! Pure functions only; no I/O, no async. Paths are resolved lexically;
//! symlinks are NOT followed, so a symlink inside the allowed root that
//! points outside of it is accepted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ValidationError;

/// Longest accepted distribution name.
pub const MAX_NAME_LEN: usize = 64;

/// Longest accepted path, in characters.
pub const MAX_PATH_LEN: usize = 4096;

/// Allow-listed distribution name grammar.
pub static DISTRO_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern; cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex")
});

/// Characters with no valid use in any accepted grammar.
pub static UNSAFE_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"[\x00-\x1f\x7f;|&`$()<>!*?\[\]{}~#'"]"#).expect("valid regex")
});

// ── ValidatedArgument ────────────────────────────────────────────────────────

/// The grammar a command-line slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgRole {
    DistributionName,
    FilePath,
}

impl fmt::Display for ArgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DistributionName => f.write_str("distribution name"),
            Self::FilePath => f.write_str("file path"),
        }
    }
}

/// A string proven to satisfy the grammar of its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedArgument {
    role: ArgRole,
    value: String,
}

impl ValidatedArgument {
    #[must_use]
    pub fn role(&self) -> ArgRole {
        self.role
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for ValidatedArgument {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ValidatedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq<str> for ValidatedArgument {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for ValidatedArgument {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

// ── Distribution names ───────────────────────────────────────────────────────

/// Validate a distribution name.
///
/// Leading or trailing whitespace is rejected rather than trimmed.
///
/// # Errors
///
/// Returns `ValidationError::InvalidName` when the name is empty, longer than
/// [`MAX_NAME_LEN`], starts with `-` (it would read as a `wsl.exe` option),
/// or contains a character outside `[A-Za-z0-9._-]`.
pub fn validate_distribution_name(name: &str) -> Result<ValidatedArgument, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidName {
        name: sanitize(name),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if name.trim() != name {
        return Err(invalid(
            "name must not start or end with whitespace".to_string(),
        ));
    }
    if name.starts_with('-') {
        return Err(invalid("name must not start with '-'".to_string()));
    }
    if !DISTRO_NAME_RE.is_match(name) {
        let bad = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
            .map_or_else(String::new, |c| format!(" (found {c:?})"));
        return Err(invalid(format!(
            "only letters, digits, '.', '_' and '-' are allowed{bad}"
        )));
    }

    Ok(ValidatedArgument {
        role: ArgRole::DistributionName,
        value: name.to_string(),
    })
}

// ── File paths ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    /// `/…`
    Root,
    /// `C:\…`
    Drive(char),
    /// `\\server\share\…`
    Unc(String, String),
    Relative,
}

impl Anchor {
    fn is_windows(&self) -> bool {
        matches!(self, Self::Drive(_) | Self::Unc(..))
    }

    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Root, Self::Root) => true,
            (Self::Drive(a), Self::Drive(b)) => a.eq_ignore_ascii_case(b),
            (Self::Unc(sa, ha), Self::Unc(sb, hb)) => {
                sa.eq_ignore_ascii_case(sb) && ha.eq_ignore_ascii_case(hb)
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
struct LexicalPath {
    anchor: Anchor,
    segments: Vec<String>,
}

impl LexicalPath {
    fn parse(raw: &str) -> Result<Self, String> {
        let unified = raw.replace('\\', "/");

        let (anchor, rest) = if let Some(unc) = unified.strip_prefix("//") {
            let mut parts = unc.splitn(3, '/');
            let server = parts.next().unwrap_or_default();
            let share = parts.next().unwrap_or_default();
            if server.is_empty() || share.is_empty() {
                return Err("UNC paths need a server and a share".to_string());
            }
            (
                Anchor::Unc(server.to_string(), share.to_string()),
                parts.next().unwrap_or_default().to_string(),
            )
        } else if let Some(drive) = drive_letter(&unified) {
            let rest = &unified[2..];
            if !rest.is_empty() && !rest.starts_with('/') {
                return Err("drive-relative paths are not supported".to_string());
            }
            (Anchor::Drive(drive), rest.to_string())
        } else if let Some(rest) = unified.strip_prefix('/') {
            (Anchor::Root, rest.to_string())
        } else {
            (Anchor::Relative, unified)
        };

        let segments = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { anchor, segments })
    }

    fn render(&self) -> String {
        match &self.anchor {
            Anchor::Root => format!("/{}", self.segments.join("/")),
            Anchor::Drive(d) => format!("{d}:\\{}", self.segments.join("\\")),
            Anchor::Unc(server, share) => {
                let mut out = format!("\\\\{server}\\{share}");
                for seg in &self.segments {
                    out.push('\\');
                    out.push_str(seg);
                }
                out
            }
            Anchor::Relative => self.segments.join("/"),
        }
    }
}

fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(d), Some(':')) if d.is_ascii_alphabetic() => Some(d.to_ascii_uppercase()),
        _ => None,
    }
}

/// Apply `.`/`..` segments on top of `base`. Fails when `..` climbs above the
/// filesystem anchor.
fn resolve_segments(base: &[String], input: &[String]) -> Option<Vec<String>> {
    let mut out = base.to_vec();
    for seg in input {
        match seg.as_str() {
            "." => {}
            ".." => {
                out.pop()?;
            }
            other => out.push(other.to_string()),
        }
    }
    Some(out)
}

/// Validate a filesystem path against an allowed root.
///
/// Both `/` and `\` are accepted as separators. Relative paths are resolved
/// against `allowed_root`. The returned argument is the resolved absolute
/// path, rendered with the root's separator style.
///
/// # Errors
///
/// Returns `ValidationError::PathTraversal` when the path is empty, contains
/// a NUL byte, climbs above the filesystem root, or resolves outside
/// `allowed_root`.
pub fn validate_file_path(
    path: &str,
    allowed_root: &str,
) -> Result<ValidatedArgument, ValidationError> {
    let traversal = |reason: &str| ValidationError::PathTraversal {
        path: sanitize(path),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(traversal("path must not be empty"));
    }
    if path.contains('\0') {
        return Err(traversal("path contains a NUL byte"));
    }
    if path.chars().count() > MAX_PATH_LEN {
        return Err(traversal("path is too long"));
    }

    let root = LexicalPath::parse(allowed_root).map_err(|r| traversal(&r))?;
    if root.anchor == Anchor::Relative {
        return Err(traversal("allowed root must be absolute"));
    }
    let root_segments = resolve_segments(&[], &root.segments)
        .ok_or_else(|| traversal("allowed root escapes the filesystem root"))?;

    let input = LexicalPath::parse(path).map_err(|r| traversal(&r))?;
    let (anchor, resolved) = if input.anchor == Anchor::Relative {
        (
            root.anchor.clone(),
            resolve_segments(&root_segments, &input.segments),
        )
    } else {
        if !input.anchor.same_as(&root.anchor) {
            return Err(traversal("path is on a different volume"));
        }
        (root.anchor.clone(), resolve_segments(&[], &input.segments))
    };
    let resolved = resolved.ok_or_else(|| traversal("path climbs above the filesystem root"))?;

    let case_insensitive = anchor.is_windows();
    let inside = resolved.len() >= root_segments.len()
        && root_segments.iter().zip(&resolved).all(|(r, p)| {
            if case_insensitive {
                r.eq_ignore_ascii_case(p)
            } else {
                r == p
            }
        });
    if !inside {
        return Err(traversal("resolved path escapes the allowed root"));
    }

    Ok(ValidatedArgument {
        role: ArgRole::FilePath,
        value: LexicalPath {
            anchor,
            segments: resolved,
        }
        .render(),
    })
}

// ── Sanitization ─────────────────────────────────────────────────────────────

/// Strip control characters and shell metacharacters.
///
/// Defense-in-depth for text that is logged or echoed back; it is never the
/// gate for a process argument.
#[must_use]
pub fn sanitize(input: &str) -> String {
    UNSAFE_CHAR_RE.replace_all(input, "").into_owned()
}
