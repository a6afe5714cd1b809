use serde::{Deserialize, Serialize};

/// Run state of a distribution as reported by `wsl --list --verbose`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistroState {
    Running,
    Stopped,
    Installing,
    Converting,
    Uninstalling,
    Unknown,
}

impl DistroState {
    /// Parse the STATE column. Unrecognized values map to `Unknown`.
    #[must_use]
    pub fn from_column(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "installing" => Self::Installing,
            "converting" => Self::Converting,
            "uninstalling" => Self::Uninstalling,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Installing => "Installing",
            Self::Converting => "Converting",
            Self::Uninstalling => "Uninstalling",
            Self::Unknown => "Unknown",
        }
    }
}

/// One installed distribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistroInfo {
    pub name: String,
    pub state: DistroState,
    /// WSL version (1 or 2). `None` when the column is missing or unparsable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(default)]
    pub is_default: bool,
}

/// JSON envelope for `wslm list --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOutput {
    pub distributions: Vec<DistroInfo>,
}

/// Whether a mutating command ran or was declined at the prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Done,
    Cancelled,
}

/// JSON envelope for every mutating command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutput {
    pub operation: crate::Operation,
    pub distribution: String,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ActionOutput {
    #[must_use]
    pub fn new(operation: crate::Operation, distribution: &str, status: ActionStatus) -> Self {
        Self {
            operation,
            distribution: distribution.to_string(),
            status,
            install_dir: None,
            archive: None,
            sha256: None,
        }
    }
}
