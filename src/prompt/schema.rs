// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structured-output schemas and boundary validation.
//!
//! Two fixed result shapes exist: one for command mode and one for script
//! mode. Providers send the schema with the request and the raw response
//! JSON is validated here by deserializing into the typed result; anything
//! that does not fit is a parse error, never trusted.

use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::types::{CommandResult, GeneratedResult, GenerationMode, ScriptResult};

/// JSON schema for the active generation mode.
pub fn for_mode(mode: GenerationMode) -> Value {
    match mode {
        GenerationMode::Command => command_schema(),
        GenerationMode::Script => script_schema(),
    }
}

/// Validate raw provider output against the mode's result shape.
pub fn parse_result(mode: GenerationMode, value: Value) -> Result<GeneratedResult, ProviderError> {
    match mode {
        GenerationMode::Command => {
            let result: CommandResult = serde_json::from_value(value)
                .map_err(|e| ProviderError::ParseError(format!("Invalid command result: {e}")))?;
            Ok(GeneratedResult::Command(result))
        }
        GenerationMode::Script => {
            let result: ScriptResult = serde_json::from_value(value)
                .map_err(|e| ProviderError::ParseError(format!("Invalid script result: {e}")))?;
            Ok(GeneratedResult::Script(result))
        }
    }
}

/// Schema for single-shell-command generation.
fn command_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "The shell command, ready to execute"
            },
            "explanation": {
                "type": "string",
                "description": "One or two sentences on what the command does"
            },
            "changelog": {
                "type": "string",
                "description": "What changed versus the previous round; empty on the first round"
            },
            "clarification_needed": {
                "type": "string",
                "description": "A question for the user when the request is ambiguous; empty otherwise"
            },
            "destructive": {
                "type": "boolean",
                "description": "True when the command deletes or overwrites data"
            },
            "should_be_script": {
                "type": "boolean",
                "description": "True when the request is too involved for a single command"
            },
            "caution": {
                "type": "string",
                "description": "Warning the user should read before running; empty when none"
            },
            "breakdown": {
                "type": "array",
                "description": "The command split into fragments, in order",
                "items": {
                    "type": "object",
                    "properties": {
                        "command": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["command", "description"],
                    "additionalProperties": false
                }
            }
        },
        "required": [
            "content", "explanation", "changelog", "clarification_needed",
            "destructive", "should_be_script", "caution", "breakdown"
        ],
        "additionalProperties": false
    })
}

/// Schema for standalone-script generation.
fn script_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "The complete script body, starting with a shebang"
            },
            "explanation": {
                "type": "string",
                "description": "One or two sentences on what the script does"
            },
            "changelog": {
                "type": "string",
                "description": "What changed versus the previous round; empty on the first round"
            },
            "clarification_needed": {
                "type": "string",
                "description": "A question for the user when the request is ambiguous; empty otherwise"
            },
            "script_name": {
                "type": "string",
                "description": "Short descriptive name for the script"
            },
            "has_parameters": {
                "type": "boolean",
                "description": "True when the script takes parameters"
            },
            "parameters": {
                "type": "array",
                "description": "Declared parameters, in the order the script expects them",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "required": { "type": "boolean" },
                        "default_value": { "type": ["string", "null"] }
                    },
                    "required": ["name", "description", "required", "default_value"],
                    "additionalProperties": false
                }
            },
            "dependencies": {
                "type": "string",
                "description": "Comma-separated package names the script needs; empty when none"
            }
        },
        "required": [
            "content", "explanation", "changelog", "clarification_needed",
            "script_name", "has_parameters", "parameters", "dependencies"
        ],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_result() {
        let value = json!({
            "content": "ls -la",
            "explanation": "lists all files",
            "changelog": "",
            "clarification_needed": "",
            "destructive": false,
            "should_be_script": false,
            "caution": "",
            "breakdown": [
                {"command": "ls", "description": "list directory contents"},
                {"command": "-la", "description": "long format, hidden files"}
            ]
        });
        let result = parse_result(GenerationMode::Command, value).unwrap();
        let command = result.as_command().unwrap();
        assert_eq!(command.content, "ls -la");
        assert_eq!(command.breakdown.len(), 2);
    }

    #[test]
    fn test_parse_script_result() {
        let value = json!({
            "content": "#!/bin/bash\ntar -czf backup.tar.gz .",
            "explanation": "archives the directory",
            "changelog": "",
            "clarification_needed": "",
            "script_name": "Backup Directory",
            "has_parameters": false,
            "parameters": [],
            "dependencies": "tar"
        });
        let result = parse_result(GenerationMode::Script, value).unwrap();
        assert_eq!(result.as_script().unwrap().script_name, "Backup Directory");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let value = json!({"completely": "wrong"});
        let err = parse_result(GenerationMode::Command, value).unwrap_err();
        assert!(matches!(err, ProviderError::ParseError(_)));
    }

    #[test]
    fn test_schemas_require_every_property() {
        for schema in [command_schema(), script_schema()] {
            let properties: Vec<String> = schema["properties"]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            let required: Vec<String> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect();
            for prop in &properties {
                assert!(required.contains(prop), "{prop} must be required");
            }
            assert_eq!(schema["additionalProperties"], json!(false));
        }
    }
}
