// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! OpenAI-compatible generator implementation.
//!
//! Works with OpenAI and any OpenAI-compatible API (Ollama, Together, Groq,
//! etc.). Structured output uses the `response_format: json_schema` contract
//! of the Chat Completions API.
//!
//! # API Reference
//!
//! See [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::ProviderError;
use crate::prompt::schema;
use crate::providers::Generator;
use crate::types::{GeneratedResult, GenerationMode, Message, Role};

/// Max tokens for a generation round.
const MAX_TOKENS: u32 = 4096;

/// Request timeout guarding against hung connections.
const TIMEOUT_SECS: u64 = 300;

/// OpenAI-compatible generator.
pub struct OpenAIGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    model_ref: String,
}

impl OpenAIGenerator {
    /// Create a new OpenAI-compatible generator. `api_key` is `None` for
    /// keyless endpoints such as local Ollama.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        model_ref: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            model_ref: model_ref.into(),
        }
    }

    /// Build the request body for the Chat Completions API.
    fn build_request(&self, mode: GenerationMode, messages: &[Message]) -> ChatRequest {
        let api_messages: Vec<ChatMessage> = messages
            .iter()
            .map(|m| ChatMessage {
                role: match m.role {
                    Role::System => "system".to_string(),
                    Role::Assistant => "assistant".to_string(),
                    Role::User => "user".to_string(),
                },
                content: m.content.clone(),
            })
            .collect();

        let schema_name = match mode {
            GenerationMode::Command => "shell_command",
            GenerationMode::Script => "shell_script",
        };

        ChatRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: Some(MAX_TOKENS),
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: schema_name.to_string(),
                    strict: true,
                    schema: schema::for_mode(mode),
                },
            },
        }
    }

    fn handle_error_response(&self, status: u16, body: &str) -> ProviderError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());
        ProviderError::api(message, status)
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn generate(
        &self,
        mode: GenerationMode,
        messages: &[Message],
    ) -> Result<GeneratedResult, ProviderError> {
        let request = self.build_request(mode, messages);

        debug!(model = %self.model, turns = messages.len(), "Sending generation request");

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("content-type", "application/json");

        if let Some(ref api_key) = self.api_key {
            req = req.header("authorization", format!("Bearer {api_key}"));
        }

        let response = req
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status.as_u16(), &body));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::ParseError("Response contained no choices".to_string())
            })?;

        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| ProviderError::ParseError(format!("Result was not JSON: {e}")))?;

        schema::parse_result(mode, value)
    }

    fn model_ref(&self) -> &str {
        &self.model_ref
    }
}

// ============================================================================
// API request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> OpenAIGenerator {
        OpenAIGenerator::new(
            Some("test-key".to_string()),
            "gpt-4o",
            "https://api.openai.com/v1",
            "openai/gpt-4o",
        )
    }

    #[test]
    fn test_build_request_roles() {
        let messages = vec![
            Message::system("instructions"),
            Message::user("list files"),
            Message::assistant("{\"content\": \"ls\"}"),
            Message::user("also show hidden"),
        ];
        let request = generator().build_request(GenerationMode::Command, &messages);
        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn test_build_request_schema_by_mode() {
        let messages = vec![Message::user("zip my files")];

        let command = generator().build_request(GenerationMode::Command, &messages);
        assert_eq!(command.response_format.json_schema.name, "shell_command");
        assert!(command.response_format.json_schema.schema["properties"]["breakdown"].is_object());

        let script = generator().build_request(GenerationMode::Script, &messages);
        assert_eq!(script.response_format.json_schema.name, "shell_script");
        assert!(script.response_format.json_schema.schema["properties"]["parameters"].is_object());
    }

    #[test]
    fn test_handle_error_response_plain_body() {
        let err = generator().handle_error_response(500, "upstream exploded");
        match err {
            ProviderError::ApiError { message, status_code } => {
                assert_eq!(message, "upstream exploded");
                assert_eq!(status_code, Some(500));
            }
            _ => panic!("Expected ApiError"),
        }
    }
}
