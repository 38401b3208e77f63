// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-provider credentials and endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// API key; falls back to the provider's environment variable when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL (Ollama and OpenAI-compatible endpoints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// On-disk configuration for shellm.
///
/// Stored as JSON in the user config directory. A default (empty) value
/// means the user has not run setup yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Model used when no `--model` override is given, as `provider/model`.
    #[serde(default)]
    pub default_model: String,

    /// All configured models, as `provider/model` identifiers.
    #[serde(default)]
    pub models: Vec<String>,

    /// Directory where generated scripts are persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts_dir: Option<PathBuf>,

    /// Per-provider settings keyed by provider name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

impl Config {
    /// Whether this config has been set up at all.
    pub fn is_configured(&self) -> bool {
        !self.default_model.is_empty() && !self.models.is_empty()
    }

    /// Whether more than one model is configured (enables model switching).
    pub fn has_multiple_models(&self) -> bool {
        self.models.len() > 1
    }

    /// Settings for a provider, if present.
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(name)
    }

    /// Resolved scripts directory, defaulting to `<data_dir>/shellm/scripts`.
    pub fn scripts_dir(&self) -> PathBuf {
        self.scripts_dir.clone().unwrap_or_else(default_scripts_dir)
    }
}

/// Default scripts directory under the platform data dir.
pub fn default_scripts_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shellm")
        .join("scripts")
}
