//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::WslmConfig;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "WSLM_CONFIG";
/// Overrides `wslExecutable` without touching the file.
pub const WSL_EXE_ENV: &str = "WSLM_WSL_EXE";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// Load the stored config and apply environment overrides.
    ///
    /// Only used for running commands; `config show` and `config set` see
    /// the file as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if any stored value is out of range.
    pub fn load_effective(&self) -> Result<WslmConfig> {
        let mut config = self.load()?;
        config.validate()?;
        if let Ok(exe) = std::env::var(WSL_EXE_ENV)
            && !exe.trim().is_empty()
        {
            config.wsl_executable = exe;
        }
        Ok(config)
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<WslmConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(WslmConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &WslmConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".wslm").join("config.yaml"))
    }
}
