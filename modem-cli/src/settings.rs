//! Persistent settings
//!
//! Defaults for every command-line option can be kept in
//! `$XDG_CONFIG_HOME/modemctl/settings.json`. Missing fields take their
//! defaults, so a file containing only `{"port": "/dev/ttyACM0"}` is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Could not determine the settings path
    #[error("could not determine settings path")]
    NoConfigDir,

    /// Failed to read or write the settings file
    #[error("settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid settings JSON
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Serial port path; detected when absent
    pub port: Option<String>,
    /// Baud rate
    pub baud_rate: u32,
    /// Clip played after answering
    pub audio_file: PathBuf,
    /// DTMF tone sent after playback
    pub dtmf_tone: String,
    /// Audio player executable; searched on PATH when absent
    pub player: Option<PathBuf>,
    /// Give up waiting for a ring after this many seconds
    pub ring_timeout_secs: Option<u64>,
    /// Skip playback
    pub no_audio: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 9600,
            audio_file: PathBuf::from("message.wav"),
            dtmf_tone: "1".to_string(),
            player: None,
            ring_timeout_secs: None,
            no_audio: false,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for modemctl
    /// Uses $XDG_CONFIG_HOME/modemctl on Linux/macOS, falls back to ~/.config/modemctl
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("modemctl"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("modemctl"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location
    ///
    /// A missing file yields defaults. An unreadable or malformed file is
    /// logged and also yields defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!("Ignoring settings: {}", e);
            Self::default()
        })
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        std::fs::write(path, json).map_err(io_err)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, None);
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.audio_file, PathBuf::from("message.wav"));
        assert_eq!(settings.dtmf_tone, "1");
        assert!(!settings.no_audio);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"port": "/dev/ttyACM0", "ring_timeout_secs": 30}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(settings.ring_timeout_secs, Some(30));
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.dtmf_tone, "1");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            port: Some("/dev/cu.usbmodem1101".to_string()),
            baud_rate: 115200,
            player: Some(PathBuf::from("/usr/bin/aplay")),
            no_audio: true,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
