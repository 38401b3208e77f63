// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading and saving.
//!
//! The config lives at `<config_dir>/shellm/config.json`. A missing file is
//! not an error: it loads as the default (unconfigured) value, which routes
//! the user into setup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::Config;
use crate::error::ConfigError;

/// File name of the on-disk configuration.
const CONFIG_FILE: &str = "config.json";

/// Resolve the path of the configuration file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("shellm").join(CONFIG_FILE))
}

/// Load the configuration from the default location.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path()?)
}

/// Load the configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_json::from_str(&raw)?;
    Ok(config)
}

/// Save the configuration to the default location, creating parent
/// directories as needed.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save the configuration to an explicit path.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join("config.json")).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_load_empty_file_gives_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "  \n").unwrap();
        let config = load_from(&path).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            default_model: "anthropic/claude-sonnet-4-20250514".to_string(),
            models: vec!["anthropic/claude-sonnet-4-20250514".to_string()],
            ..Default::default()
        };
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path).unwrap();
        assert!(loaded.is_configured());
        assert_eq!(loaded.default_model, config.default_model);
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(load_from(&path).is_err());
    }
}
