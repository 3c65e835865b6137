//! User settings stored as JSON in the platform config directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "parley";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings format error: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Email entered at the last login with "remember me" ticked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_email: Option<String>,
}

/// `<config dir>/parley/settings.json`
pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
    Ok(dir.join(APP_DIR).join(SETTINGS_FILE))
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let file = File::open(path)?;
        let settings: Settings = serde_json::from_reader(file)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }
}
