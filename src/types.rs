// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types for shellm.
//!
//! This module defines the fundamental data structures used throughout the
//! application: conversation messages, the two structured generation results
//! (command and script), and captured execution outcomes.

use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message in a conversation with the generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

// ============================================================================
// Generation Results
// ============================================================================

/// Whether the model is asked for a single shell command or a standalone
/// script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Command,
    Script,
}

impl GenerationMode {
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script)
    }
}

/// One step of a command breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownStep {
    /// The command fragment this step describes.
    pub command: String,
    /// What the fragment does.
    pub description: String,
}

/// A declared script parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptParameter {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// Structured result for command-mode generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// The shell command itself.
    pub content: String,
    /// Short explanation of what the command does.
    pub explanation: String,
    /// Changes made relative to the previous round (refinements only).
    #[serde(default)]
    pub changelog: String,
    /// Non-empty when the model needs more information before generating.
    #[serde(default)]
    pub clarification_needed: String,
    /// The command modifies or deletes data.
    #[serde(default)]
    pub destructive: bool,
    /// The request is too involved for a one-liner.
    #[serde(default)]
    pub should_be_script: bool,
    /// Free-form warning the user should read before running.
    #[serde(default)]
    pub caution: String,
    /// Per-fragment breakdown of the command.
    #[serde(default)]
    pub breakdown: Vec<BreakdownStep>,
}

/// Structured result for script-mode generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResult {
    /// The full script body.
    pub content: String,
    /// Short explanation of what the script does.
    pub explanation: String,
    #[serde(default)]
    pub changelog: String,
    #[serde(default)]
    pub clarification_needed: String,
    /// Name suggested by the model; normalized once on first creation.
    #[serde(default)]
    pub script_name: String,
    #[serde(default)]
    pub has_parameters: bool,
    #[serde(default)]
    pub parameters: Vec<ScriptParameter>,
    /// Comma-separated package names the script depends on.
    #[serde(default)]
    pub dependencies: String,
}

/// A validated structured result from the generation provider.
///
/// Deserialization is deliberately not derived here: the two variants share
/// their required fields, so raw provider output is parsed against the
/// mode's schema in [`crate::prompt::schema`] instead.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GeneratedResult {
    Script(ScriptResult),
    Command(CommandResult),
}

impl GeneratedResult {
    /// The generated command text or script body.
    pub fn content(&self) -> &str {
        match self {
            Self::Command(c) => &c.content,
            Self::Script(s) => &s.content,
        }
    }

    /// The model's explanation of the result.
    pub fn explanation(&self) -> &str {
        match self {
            Self::Command(c) => &c.explanation,
            Self::Script(s) => &s.explanation,
        }
    }

    /// The changelog for a refinement round, if any.
    pub fn changelog(&self) -> &str {
        match self {
            Self::Command(c) => &c.changelog,
            Self::Script(s) => &s.changelog,
        }
    }

    /// The clarification question, empty when none is needed.
    pub fn clarification_needed(&self) -> &str {
        match self {
            Self::Command(c) => &c.clarification_needed,
            Self::Script(s) => &s.clarification_needed,
        }
    }

    pub fn as_command(&self) -> Option<&CommandResult> {
        match self {
            Self::Command(c) => Some(c),
            Self::Script(_) => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptResult> {
        match self {
            Self::Script(s) => Some(s),
            Self::Command(_) => None,
        }
    }
}

// ============================================================================
// Execution Outcomes
// ============================================================================

/// Maximum number of captured output characters kept on an outcome.
pub const MAX_CAPTURED_CHARS: usize = 1000;

/// Captured result of running a generated command or script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Combined stdout/stderr, truncated to [`MAX_CAPTURED_CHARS`].
    pub output: String,
    /// Whether the run produced stderr output or a failing exit code.
    pub error: bool,
}

impl ExecutionOutcome {
    /// Build an outcome from raw captured output, applying truncation.
    pub fn from_captured(output: &str, error: bool) -> Self {
        Self {
            output: truncate_captured(output),
            error,
        }
    }
}

/// Truncate captured output to [`MAX_CAPTURED_CHARS`] characters, appending
/// a marker that states how many characters were omitted.
pub fn truncate_captured(output: &str) -> String {
    let total = output.chars().count();
    if total <= MAX_CAPTURED_CHARS {
        return output.to_string();
    }

    let kept: String = output.chars().take(MAX_CAPTURED_CHARS).collect();
    format!("{}... ({} more characters)", kept, total - MAX_CAPTURED_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("list files");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "list files");

        assert_eq!(Message::assistant("ok").role, Role::Assistant);
        assert_eq!(Message::system("sys").role, Role::System);
    }

    #[test]
    fn test_command_result_deserialize_minimal() {
        let json = serde_json::json!({
            "content": "ls -la",
            "explanation": "lists files",
            "clarification_needed": ""
        });
        let result: CommandResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.content, "ls -la");
        assert!(!result.destructive);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_script_result_deserialize() {
        let json = serde_json::json!({
            "content": "#!/bin/bash\necho hi",
            "explanation": "greets",
            "script_name": "Greet Me",
            "has_parameters": true,
            "parameters": [
                {"name": "name", "description": "who to greet", "required": true}
            ],
            "dependencies": "curl, jq"
        });
        let result: ScriptResult = serde_json::from_value(json).unwrap();
        assert!(result.has_parameters);
        assert_eq!(result.parameters.len(), 1);
        assert_eq!(result.parameters[0].name, "name");
        assert!(result.parameters[0].default_value.is_none());
    }

    #[test]
    fn test_generated_result_accessors() {
        let cmd = GeneratedResult::Command(CommandResult {
            content: "ls".into(),
            explanation: "lists".into(),
            changelog: String::new(),
            clarification_needed: "which dir?".into(),
            destructive: false,
            should_be_script: false,
            caution: String::new(),
            breakdown: Vec::new(),
        });
        assert_eq!(cmd.content(), "ls");
        assert_eq!(cmd.clarification_needed(), "which dir?");
        assert!(cmd.as_command().is_some());
        assert!(cmd.as_script().is_none());
    }

    #[test]
    fn test_truncate_captured_short() {
        let output = "short output";
        assert_eq!(truncate_captured(output), output);
    }

    #[test]
    fn test_truncate_captured_exact_limit() {
        let output = "x".repeat(MAX_CAPTURED_CHARS);
        assert_eq!(truncate_captured(&output), output);
    }

    #[test]
    fn test_truncate_captured_long() {
        let output = "y".repeat(MAX_CAPTURED_CHARS + 234);
        let truncated = truncate_captured(&output);
        let marker = "... (234 more characters)";
        assert_eq!(truncated.len(), MAX_CAPTURED_CHARS + marker.len());
        assert!(truncated.ends_with(marker));
    }

    #[test]
    fn test_execution_outcome_from_captured() {
        let outcome = ExecutionOutcome::from_captured("hello", true);
        assert_eq!(outcome.output, "hello");
        assert!(outcome.error);
    }
}
