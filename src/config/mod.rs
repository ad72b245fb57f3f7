// SPDX-License-Identifier: MPL-2.0
//! Engine configuration, loaded from and saved to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use vidlens::config::{self, Config};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.playback_fps = Some(24.0);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

use crate::error::Result;
use crate::playback::PlaybackRate;
use crate::source::frame_cache::{CacheConfig, DEFAULT_CACHE_SIZE_BYTES, DEFAULT_MAX_FRAMES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "vidlens";

/// Minimum supported playback rate in frames per second.
pub const MIN_PLAYBACK_FPS: f64 = 0.1;

/// Maximum supported playback rate in frames per second.
pub const MAX_PLAYBACK_FPS: f64 = 240.0;

/// Default playback rate when neither the file nor the configuration
/// provides one.
pub const DEFAULT_PLAYBACK_FPS: f64 = 30.0;

/// Persisted engine settings.
///
/// Every field is optional so older settings files keep loading as new
/// fields are added; missing fields fall back to the engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Preferred playback rate, overriding the file's native rate.
    pub playback_fps: Option<f64>,

    /// Seek cache byte budget.
    #[serde(default)]
    pub cache_max_bytes: Option<usize>,

    /// Seek cache frame-count budget.
    #[serde(default)]
    pub cache_max_frames: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playback_fps: None,
            cache_max_bytes: None,
            cache_max_frames: None,
        }
    }
}

impl Config {
    /// Resolves the configured playback rate, clamped to the valid range.
    #[must_use]
    pub fn playback_rate(&self) -> PlaybackRate {
        PlaybackRate::new(self.playback_fps.unwrap_or(DEFAULT_PLAYBACK_FPS))
    }

    /// Resolves the seek cache configuration.
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            self.cache_max_bytes.unwrap_or(DEFAULT_CACHE_SIZE_BYTES),
            self.cache_max_frames.unwrap_or(DEFAULT_MAX_FRAMES),
        )
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default location.
///
/// Returns the default configuration when no settings file exists.
pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

/// Saves the configuration to the default location.
pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads the configuration from a specific path.
///
/// Unparseable files fall back to the default configuration rather than
/// failing, so a damaged settings file never blocks the engine.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

/// Saves the configuration to a specific path, creating parent directories.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_engine_defaults() {
        let config = Config::default();
        assert_eq!(config.playback_rate().value(), DEFAULT_PLAYBACK_FPS);
        assert_eq!(config.cache_config().max_bytes, DEFAULT_CACHE_SIZE_BYTES);
        assert_eq!(config.cache_config().max_frames, DEFAULT_MAX_FRAMES);
    }

    #[test]
    fn configured_playback_rate_is_clamped() {
        let config = Config {
            playback_fps: Some(100_000.0),
            ..Default::default()
        };
        assert_eq!(config.playback_rate().value(), MAX_PLAYBACK_FPS);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let config = Config {
            playback_fps: Some(24.0),
            cache_max_bytes: Some(32 * 1024 * 1024),
            cache_max_frames: Some(32),
        };

        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_missing_file_fails_with_io_error() {
        let result = load_from_path(Path::new("/nonexistent/settings.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn damaged_settings_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is [not valid toml").unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        save_to_path(&Config::default(), &path).unwrap();
        assert!(path.exists());
    }
}
