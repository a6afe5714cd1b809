//! Domain types and validators for wslm configuration.
//!
//! Pure functions only; no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use wslm_common::Operation;

use crate::domain::command::WSL_EXE;
use crate::domain::error::ConfigError;
use crate::domain::security::{DEFAULT_LIMIT, DEFAULT_WINDOW, RateLimitPolicy};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "rateLimitPerMinute",
    "importExportTimeoutMs",
    "commandTimeoutMs",
    "allowedRootPath",
    "wslExecutable",
    "rateLimits.<operation>",
];

pub const DEFAULT_IMPORT_EXPORT_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 30_000;

const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 86_400_000;
const MAX_RATE_LIMIT: u32 = 1_000;
const RATE_LIMITS_PREFIX: &str = "rateLimits.";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.wslm/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WslmConfig {
    /// Operations of one kind allowed per minute.
    pub rate_limit_per_minute: u32,
    /// Deadline for Create, Import and Export.
    pub import_export_timeout_ms: u64,
    /// Deadline for every other bounded operation.
    pub command_timeout_ms: u64,
    /// Root every file path must stay under. `None` means the home directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_root_path: Option<String>,
    /// Executable spawned for every operation.
    pub wsl_executable: String,
    /// Per-operation overrides of `rate_limit_per_minute`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rate_limits: BTreeMap<Operation, u32>,
}

impl Default for WslmConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: DEFAULT_LIMIT,
            import_export_timeout_ms: DEFAULT_IMPORT_EXPORT_TIMEOUT_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            allowed_root_path: None,
            wsl_executable: WSL_EXE.to_string(),
            rate_limits: BTreeMap::new(),
        }
    }
}

impl WslmConfig {
    /// Deadline applied to `operation`.
    #[must_use]
    pub fn timeout_for(&self, operation: Operation) -> Duration {
        let ms = match operation {
            Operation::Create | Operation::Import | Operation::Export => {
                self.import_export_timeout_ms
            }
            _ => self.command_timeout_ms,
        };
        Duration::from_millis(ms)
    }

    #[must_use]
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        self.rate_limits.iter().fold(
            RateLimitPolicy::uniform(self.rate_limit_per_minute, DEFAULT_WINDOW),
            |policy, (op, limit)| policy.with_override(*op, *limit),
        )
    }

    /// Check every field against the same rules `set` applies.
    ///
    /// A hand-edited file bypasses `set`, so anything loaded from disk goes
    /// through here before it reaches the executor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        validate_config_value("rateLimitPerMinute", &self.rate_limit_per_minute.to_string())?;
        validate_config_value(
            "importExportTimeoutMs",
            &self.import_export_timeout_ms.to_string(),
        )?;
        validate_config_value("commandTimeoutMs", &self.command_timeout_ms.to_string())?;
        if let Some(root) = &self.allowed_root_path {
            validate_config_value("allowedRootPath", root)?;
        }
        validate_config_value("wslExecutable", &self.wsl_executable)?;
        for (op, limit) in &self.rate_limits {
            validate_config_value(&format!("{RATE_LIMITS_PREFIX}{op}"), &limit.to_string())?;
        }
        Ok(())
    }

    /// Validate and store one `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "rateLimitPerMinute" => self.rate_limit_per_minute = value.parse()?,
            "importExportTimeoutMs" => self.import_export_timeout_ms = value.parse()?,
            "commandTimeoutMs" => self.command_timeout_ms = value.parse()?,
            "allowedRootPath" => self.allowed_root_path = Some(value.to_string()),
            "wslExecutable" => self.wsl_executable = value.to_string(),
            _ => {
                let op = rate_limit_operation(key)?;
                self.rate_limits.insert(op, value.parse()?);
            }
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

fn unknown_key(key: &str) -> anyhow::Error {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
    .into()
}

fn invalid_value(key: &str, value: &str, expected: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
    .into()
}

fn rate_limit_operation(key: &str) -> Result<Operation> {
    key.strip_prefix(RATE_LIMITS_PREFIX)
        .and_then(|op| op.parse().ok())
        .ok_or_else(|| unknown_key(key))
}

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if key.starts_with(RATE_LIMITS_PREFIX) {
        return rate_limit_operation(key).map(|_| ());
    }
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "importExportTimeoutMs" | "commandTimeoutMs" => {
            let expected = format!("milliseconds between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}");
            match value.parse::<u64>() {
                Ok(ms) if (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&ms) => Ok(()),
                _ => Err(invalid_value(key, value, expected)),
            }
        }
        "allowedRootPath" => {
            if is_absolute(value) {
                Ok(())
            } else {
                Err(invalid_value(
                    key,
                    value,
                    r"an absolute path such as /home/user or C:\Users\user",
                ))
            }
        }
        "wslExecutable" => {
            if value.trim().is_empty() || value.trim() != value {
                Err(invalid_value(
                    key,
                    value,
                    "a non-empty executable name or path",
                ))
            } else {
                Ok(())
            }
        }
        _ => {
            let expected = format!("an integer between 1 and {MAX_RATE_LIMIT}");
            match value.parse::<u32>() {
                Ok(n) if (1..=MAX_RATE_LIMIT).contains(&n) => Ok(()),
                _ => Err(invalid_value(key, value, expected)),
            }
        }
    }
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with(r"\\")
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && matches!(bytes[2], b'\\' | b'/'))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
