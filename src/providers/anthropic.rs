// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Anthropic Claude generator implementation.
//!
//! Structured output is obtained by forcing a single tool call whose input
//! schema is the result schema for the active mode; the tool input comes
//! back as validated JSON.
//!
//! # API Reference
//!
//! See [Anthropic Messages API](https://docs.anthropic.com/en/api/messages).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::ProviderError;
use crate::prompt::schema;
use crate::providers::Generator;
use crate::types::{GeneratedResult, GenerationMode, Message, Role};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Name of the forced structured-output tool.
const RESULT_TOOL: &str = "emit_result";

/// Max tokens for a generation round.
const MAX_TOKENS: u32 = 4096;

/// Request timeout. Generation runs to natural completion; this only guards
/// against a hung connection.
const TIMEOUT_SECS: u64 = 300;

/// Anthropic Claude generator.
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    model_ref: String,
}

impl AnthropicGenerator {
    /// Create a new Anthropic generator.
    pub fn new(
        api_key: impl Into<String>,
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
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            model_ref: model_ref.into(),
        }
    }

    /// Build the request body for the Messages API.
    ///
    /// The system instruction travels in the dedicated `system` field; the
    /// remaining turns map directly onto API messages.
    fn build_request(&self, mode: GenerationMode, messages: &[Message]) -> AnthropicRequest {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());

        let api_messages: Vec<ApiMessage> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::Assistant => "assistant".to_string(),
                    _ => "user".to_string(),
                },
                content: m.content.clone(),
            })
            .collect();

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system,
            messages: api_messages,
            tools: vec![ApiTool {
                name: RESULT_TOOL.to_string(),
                description: "Report the generated result.".to_string(),
                input_schema: schema::for_mode(mode),
            }],
            tool_choice: ToolChoice {
                choice_type: "tool".to_string(),
                name: RESULT_TOOL.to_string(),
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
impl Generator for AnthropicGenerator {
    async fn generate(
        &self,
        mode: GenerationMode,
        messages: &[Message],
    ) -> Result<GeneratedResult, ProviderError> {
        let request = self.build_request(mode, messages);

        debug!(model = %self.model, turns = messages.len(), "Sending generation request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status.as_u16(), &body));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let input = api_response
            .content
            .into_iter()
            .find(|block| block.block_type == "tool_use" && block.name.as_deref() == Some(RESULT_TOOL))
            .and_then(|block| block.input)
            .ok_or_else(|| {
                ProviderError::ParseError("Response contained no structured result".to_string())
            })?;

        schema::parse_result(mode, input)
    }

    fn model_ref(&self) -> &str {
        &self.model_ref
    }
}

// ============================================================================
// API request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    tools: Vec<ApiTool>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ApiTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
