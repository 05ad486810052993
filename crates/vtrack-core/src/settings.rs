//! User-adjustable settings, persisted as a small JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, WeekStart};

pub const DEFAULT_VV_THRESHOLD: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum daily views for a video not yet in the store to be admitted.
    pub vv_threshold: u32,
    pub week_start: WeekStart,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vv_threshold: DEFAULT_VV_THRESHOLD,
            week_start: WeekStart::Sunday,
        }
    }
}

/// Settings bound to the file they were loaded from. Every setter writes
/// the whole document back before returning.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsIo`] if the file exists but cannot be
    /// read, [`ConfigError::SettingsParse`] if it is not valid JSON, or
    /// [`ConfigError::Validation`] if it holds a zero threshold.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = match std::fs::read_to_string(path) {
            Ok(content) => {
                let parsed: Settings =
                    serde_json::from_str(&content).map_err(ConfigError::SettingsParse)?;
                validate_threshold(parsed.vv_threshold)?;
                parsed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                return Err(ConfigError::SettingsIo {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero threshold, or
    /// [`ConfigError::SettingsIo`] if the document cannot be written.
    pub fn set_vv_threshold(&mut self, threshold: u32) -> Result<(), ConfigError> {
        validate_threshold(threshold)?;
        self.settings.vv_threshold = threshold;
        self.save()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsIo`] if the document cannot be written.
    pub fn set_week_start(&mut self, week_start: WeekStart) -> Result<(), ConfigError> {
        self.settings.week_start = week_start;
        self.save()
    }

    fn save(&self) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::SettingsIo {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body =
            serde_json::to_string_pretty(&self.settings).map_err(ConfigError::SettingsParse)?;
        std::fs::write(&self.path, body).map_err(io_err)
    }
}

fn validate_threshold(threshold: u32) -> Result<(), ConfigError> {
    if threshold == 0 {
        return Err(ConfigError::Validation(
            "vv_threshold must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
