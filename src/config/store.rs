//! Config store for loading and saving config.toml.

use std::path::{Path, PathBuf};

use crate::error::{KindlingError, Result};

use super::Config;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load the config; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        load_from(&self.config_path)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config).map_err(|e| write_failed(&self.config_path, e))?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
        }

        std::fs::write(&self.config_path, content)
            .map_err(|e| write_failed(&self.config_path, e))?;
        Ok(())
    }

    /// Persist the answer to the first-run auto-install prompt, keeping other keys.
    pub fn save_auto_install(&self, value: bool) -> Result<()> {
        let mut config = self.load()?;
        config.auto_install = Some(value);
        self.save(&config)
    }
}

/// Parse a config file at an explicit path.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| KindlingError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    toml::from_str(&content).map_err(|e| KindlingError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_failed(path: &Path, reason: impl ToString) -> KindlingError {
    KindlingError::ConfigWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
