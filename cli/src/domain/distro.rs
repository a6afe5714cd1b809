//! Distribution listings and managed install locations.

use wslm_common::{DistroInfo, DistroState};

use crate::domain::validate::ValidatedArgument;

/// Directory under the allowed root where `create` places distributions.
pub const MANAGED_DIR: [&str; 2] = [".wslm", "distros"];

/// Parse decoded `wsl --list --verbose` output.
///
/// The header row and blank lines are skipped. A leading `*` marks the
/// default distribution. Rows that do not end in `STATE VERSION` columns
/// (e.g. "has no installed distributions") yield nothing.
#[must_use]
pub fn parse_list_verbose(text: &str) -> Vec<DistroInfo> {
    text.lines()
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}'))
        .filter(|line| !line.is_empty())
        .filter_map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Option<DistroInfo> {
    let (is_default, rest) = match line.strip_prefix('*') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, line),
    };

    let columns: Vec<&str> = rest.split_whitespace().collect();
    let [name @ .., state, version] = columns.as_slice() else {
        return None;
    };
    if name.is_empty() || name[0].eq_ignore_ascii_case("NAME") {
        return None;
    }
    let version = version.parse::<u8>().ok()?;

    Some(DistroInfo {
        name: name.join(" "),
        state: DistroState::from_column(state),
        version: Some(version),
        is_default,
    })
}

/// Install directory for a distribution created by `wslm create`, rendered
/// in the separator style of `allowed_root`.
#[must_use]
pub fn managed_install_dir(allowed_root: &str, name: &ValidatedArgument) -> String {
    let sep = if allowed_root.contains('\\') && !allowed_root.contains('/') {
        '\\'
    } else {
        '/'
    };
    let mut dir = allowed_root.trim_end_matches(['/', '\\']).to_string();
    for part in MANAGED_DIR.iter().copied().chain([name.as_str()]) {
        dir.push(sep);
        dir.push_str(part);
    }
    dir
}
