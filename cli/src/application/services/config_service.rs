//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::WslmConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored configuration cannot be read.
pub fn load_config(store: &impl ConfigStore) -> Result<WslmConfig> {
    store.load()
}

/// Validate and persist a single setting, returning the updated config.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the file cannot be
/// written. Nothing is written on a validation failure.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<WslmConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::info!(key, value, "config updated");
    Ok(config)
}
