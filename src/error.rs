// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for shellm.
//!
//! This module provides strongly-typed errors for the different parts of the
//! application, using `thiserror` for ergonomic error definitions and
//! `anyhow` for error propagation at the application boundary.

use thiserror::Error;

/// Errors that can occur while talking to a generation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Response parsing error: {0}")]
    ParseError(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid model reference '{0}': expected provider/model")]
    InvalidModelRef(String),
}

impl ProviderError {
    /// Create an API error with status code.
    pub fn api(message: impl Into<String>, status_code: u16) -> Self {
        Self::ApiError {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create an API error without status code.
    pub fn api_message(message: impl Into<String>) -> Self {
        Self::ApiError {
            message: message.into(),
            status_code: None,
        }
    }

    /// Check if this error is fatal before the conversation starts.
    ///
    /// Malformed model references and unknown providers abort the process;
    /// everything else is reported and ends the conversation normally.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidModelRef(_) | Self::UnknownProvider(_))
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("No config directory available on this platform")]
    NoConfigDir,

    #[error("IO error reading config: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Errors that can occur while executing a generated command or script.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("IO error during execution: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// Errors that can occur while persisting or loading scripts.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Script not found: {0}")]
    NotFound(String),

    #[error("Failed to save script: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ScriptError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_api() {
        let err = ProviderError::api("Bad request", 400);
        match err {
            ProviderError::ApiError {
                message,
                status_code,
            } => {
                assert_eq!(message, "Bad request");
                assert_eq!(status_code, Some(400));
            }
            _ => panic!("Expected ApiError"),
        }
    }

    #[test]
    fn test_provider_error_input_classification() {
        assert!(ProviderError::InvalidModelRef("nonsense".into()).is_input_error());
        assert!(ProviderError::UnknownProvider("acme".into()).is_input_error());
        assert!(!ProviderError::NetworkError("timeout".into()).is_input_error());
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let config_err: ConfigError = result.unwrap_err().into();
        assert!(matches!(config_err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_script_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ScriptError = io_err.into();
        assert!(matches!(err, ScriptError::NotFound(_)));
    }
}
