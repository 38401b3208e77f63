// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generation providers.
//!
//! This module provides implementations of the [`Generator`] trait for the
//! supported model backends:
//!
//! - [`anthropic::AnthropicGenerator`] - Claude models via the Messages API
//! - [`openai::OpenAIGenerator`] - OpenAI, Ollama, and OpenAI-compatible APIs
//!
//! A generator takes the ordered message list built from the conversation
//! context and returns one schema-validated [`GeneratedResult`]. Any
//! provider, network, or validation failure is a single error; the core
//! never retries.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicGenerator;
pub use openai::OpenAIGenerator;

use async_trait::async_trait;

use crate::config::{parse_model_ref, Config};
use crate::error::ProviderError;
use crate::types::{GeneratedResult, GenerationMode, Message};

/// A structured-output generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate one structured result for the given mode and message list.
    ///
    /// The first message is the system instruction; the rest alternate
    /// user/assistant turns ending with the in-progress user turn.
    async fn generate(
        &self,
        mode: GenerationMode,
        messages: &[Message],
    ) -> Result<GeneratedResult, ProviderError>;

    /// The `provider/model` identifier this generator serves.
    fn model_ref(&self) -> &str;
}

/// Boxed generator for dynamic dispatch.
pub type BoxedGenerator = Box<dyn Generator>;

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Anthropic Claude models
    Anthropic,
    /// OpenAI GPT models
    OpenAI,
    /// Ollama local models (OpenAI-compatible endpoint)
    Ollama,
}

impl ProviderKind {
    /// Default base URL for this provider.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Environment variable consulted for the API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Whether this provider requires an API key.
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "gpt" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "Anthropic"),
            Self::OpenAI => write!(f, "OpenAI"),
            Self::Ollama => write!(f, "Ollama"),
        }
    }
}

/// Create a generator for a `provider/model` identifier, resolving
/// credentials from the configuration with environment-variable fallback.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidModelRef`] for a malformed identifier,
/// [`ProviderError::UnknownProvider`] for an unrecognized provider name, and
/// [`ProviderError::NotConfigured`] when a required API key is missing.
pub fn create_generator(
    config: &Config,
    model_ref: &str,
) -> Result<BoxedGenerator, ProviderError> {
    let (provider_name, model) = parse_model_ref(model_ref)?;
    let kind: ProviderKind = provider_name.parse()?;
    let settings = config.provider(provider_name);

    let api_key = settings
        .and_then(|s| s.api_key.clone())
        .or_else(|| kind.api_key_env().and_then(|var| std::env::var(var).ok()));

    let base_url = settings
        .and_then(|s| s.base_url.clone())
        .unwrap_or_else(|| kind.default_base_url().to_string());

    match kind {
        ProviderKind::Anthropic => {
            let api_key = api_key.ok_or_else(|| {
                ProviderError::NotConfigured(
                    "API key required for Anthropic (set it in the config or ANTHROPIC_API_KEY)"
                        .to_string(),
                )
            })?;
            Ok(Box::new(AnthropicGenerator::new(
                api_key,
                model,
                base_url,
                model_ref,
            )))
        }
        ProviderKind::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                ProviderError::NotConfigured(
                    "API key required for OpenAI (set it in the config or OPENAI_API_KEY)"
                        .to_string(),
                )
            })?;
            Ok(Box::new(OpenAIGenerator::new(
                Some(api_key),
                model,
                base_url,
                model_ref,
            )))
        }
        ProviderKind::Ollama => Ok(Box::new(OpenAIGenerator::new(
            api_key, model, base_url, model_ref,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(provider: &str, key: Option<&str>) -> Config {
        let mut config = Config {
            default_model: format!("{provider}/test-model"),
            models: vec![format!("{provider}/test-model")],
            ..Default::default()
        };
        config.providers.insert(
            provider.to_string(),
            crate::config::ProviderSettings {
                api_key: key.map(str::to_string),
                base_url: None,
            },
        );
        config
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("CLAUDE".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!(matches!(
            "acme".parse::<ProviderKind>(),
            Err(ProviderError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_provider_kind_api_keys() {
        assert!(ProviderKind::Anthropic.requires_api_key());
        assert!(ProviderKind::OpenAI.requires_api_key());
        assert!(!ProviderKind::Ollama.requires_api_key());
    }

    #[test]
    fn test_create_generator_malformed_ref() {
        let config = Config::default();
        assert!(matches!(
            create_generator(&config, "no-slash"),
            Err(ProviderError::InvalidModelRef(_))
        ));
    }

    #[test]
    fn test_create_generator_unknown_provider() {
        let config = Config::default();
        assert!(matches!(
            create_generator(&config, "acme/model-1"),
            Err(ProviderError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_create_generator_with_config_key() {
        let config = configured("anthropic", Some("test-key"));
        let generator =
            create_generator(&config, "anthropic/claude-sonnet-4-20250514").unwrap();
        assert_eq!(generator.model_ref(), "anthropic/claude-sonnet-4-20250514");
    }

    #[test]
    fn test_create_generator_ollama_without_key() {
        let config = configured("ollama", None);
        assert!(create_generator(&config, "ollama/llama3.2").is_ok());
    }
}
