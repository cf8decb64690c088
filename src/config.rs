use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{alog_debug, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    pub log_dir: Option<String>,
}

impl Config {
    pub fn anvil_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".anvil"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::anvil_dir()?.join("anvil.toml"))
    }

    pub fn resolved_log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => Self::anvil_dir(),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(self.resolved_log_dir()?.join("anvil.log"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        alog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            alog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        alog_debug!(
            "Config loaded: debug={}, log_dir={:?}",
            config.debug,
            config.log_dir
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let anvil_dir = Self::anvil_dir()?;
        alog_debug!("Config::save anvil_dir={}", anvil_dir.display());
        if !anvil_dir.exists() {
            alog_debug!("Creating anvil directory");
            fs::create_dir_all(&anvil_dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        alog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        let anvil_dir = Self::anvil_dir()?;
        let log_dir = self.resolved_log_dir()?;
        alog_debug!(
            "Config::ensure_dirs anvil={} logs={}",
            anvil_dir.display(),
            log_dir.display()
        );
        if !anvil_dir.exists() {
            fs::create_dir_all(&anvil_dir)?;
        }
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }
        Ok(())
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
