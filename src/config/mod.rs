// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading for shellm.
//!
//! The configuration names the default model, the full set of configured
//! `provider/model` identifiers, the scripts directory, and per-provider
//! credentials. An unconfigured (empty) value routes the user into setup.

pub mod loader;
pub mod types;

pub use loader::{config_path, load, load_from, save, save_to};
pub use types::{default_scripts_dir, Config, ProviderSettings};

use crate::error::ProviderError;

/// Split a `provider/model` identifier into its two parts.
///
/// The model part may itself contain slashes (some Ollama tags do), so only
/// the first slash separates.
pub fn parse_model_ref(model_ref: &str) -> Result<(&str, &str), ProviderError> {
    match model_ref.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            Ok((provider, model))
        }
        _ => Err(ProviderError::InvalidModelRef(model_ref.to_string())),
    }
}
