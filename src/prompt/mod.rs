// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generation request builder.
//!
//! Turns the conversation context into the ordered message list the
//! generator consumes: one mode-specific system instruction, then for each
//! completed exchange a user turn (derived from its kind) followed by an
//! assistant turn carrying the serialized prior result, and finally a user
//! turn for the exchange in progress.

pub mod schema;
pub mod templates;

use crate::host::HostSnapshot;
use crate::state::context::{Context, Exchange, ExchangeKind};
use crate::types::{GenerationMode, Message};

/// Build the full message list for a generation round.
pub fn build_messages(ctx: &Context, host: &HostSnapshot) -> Vec<Message> {
    let mode = if ctx.script_mode {
        GenerationMode::Script
    } else {
        GenerationMode::Command
    };

    let mut messages = Vec::with_capacity(ctx.history.len() * 2 + 2);
    messages.push(Message::system(templates::system_instruction(mode, host)));

    for exchange in &ctx.history {
        messages.push(Message::user(user_turn(exchange)));
        if let Some(response) = &exchange.response {
            let serialized = serde_json::to_string(response)
                .unwrap_or_else(|_| response.content().to_string());
            messages.push(Message::assistant(serialized));
        }
    }

    messages.push(Message::user(user_turn(&ctx.current)));
    messages
}

/// Render one exchange as the user turn the model sees.
fn user_turn(exchange: &Exchange) -> String {
    let mut turn = match exchange.kind {
        ExchangeKind::Prompt => exchange.request.clone(),
        ExchangeKind::Clarification => format!(
            "Answer to your clarification question: {}",
            exchange.request
        ),
        ExchangeKind::Refinement => {
            let mut text = format!("Refine the previous result: {}", exchange.request);
            if let Some(outcome) = &exchange.execution {
                let label = if outcome.error {
                    "Output from running it (it failed)"
                } else {
                    "Output from running it"
                };
                text.push_str(&format!("\n\n{label}:\n{}", outcome.output));
            }
            text
        }
    };

    if let Some(script) = &exchange.existing_script {
        turn.push_str(&format!("\n\nExisting script to work from:\n{script}"));
    }

    if exchange.refused_clarification {
        turn.push_str("\n\n(The user declined to answer your clarification question.)");
    }

    turn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandResult, ExecutionOutcome, GeneratedResult, Role};

    fn host() -> HostSnapshot {
        HostSnapshot {
            os: "linux".into(),
            arch: "x86_64".into(),
            shell: "bash".into(),
            cwd: "/tmp".into(),
            ..Default::default()
        }
    }

    fn command_response(content: &str) -> GeneratedResult {
        GeneratedResult::Command(CommandResult {
            content: content.into(),
            explanation: "does things".into(),
            changelog: String::new(),
            clarification_needed: String::new(),
            destructive: false,
            should_be_script: false,
            caution: String::new(),
            breakdown: Vec::new(),
        })
    }

    #[test]
    fn test_first_round_messages() {
        let ctx = Context::new("openai/gpt-4o", false, "list files", false, false);
        let messages = build_messages(&ctx, &host());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Shell: bash"));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "list files");
    }

    #[test]
    fn test_history_becomes_turn_pairs() {
        let mut ctx = Context::new("openai/gpt-4o", false, "list files", false, false);
        ctx.current.response = Some(command_response("ls"));
        ctx.begin_refinement("show sizes too", None);

        let messages = build_messages(&ctx, &host());
        // system, user(prompt), assistant(result), user(refinement)
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "list files");
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2].content.contains("\"content\":\"ls\""));
        assert!(messages[3].content.starts_with("Refine the previous result: show sizes too"));
    }

    #[test]
    fn test_refinement_turn_embeds_execution_output() {
        let exchange = Exchange::refinement(
            "fix the errors",
            Some(ExecutionOutcome::from_captured("No such file", true)),
        );
        let turn = user_turn(&exchange);
        assert!(turn.contains("fix the errors"));
        assert!(turn.contains("(it failed)"));
        assert!(turn.contains("No such file"));
    }

    #[test]
    fn test_clarification_turn_wrapper() {
        let exchange = Exchange::clarification("only the src directory");
        let turn = user_turn(&exchange);
        assert!(turn.starts_with("Answer to your clarification question:"));
        assert!(turn.contains("only the src directory"));
    }

    #[test]
    fn test_refused_clarification_noted() {
        let mut exchange = Exchange::prompt("zip my files");
        exchange.refused_clarification = true;
        assert!(user_turn(&exchange).contains("declined to answer"));
    }

    #[test]
    fn test_existing_script_included() {
        let mut exchange = Exchange::prompt("make it quieter");
        exchange.existing_script = Some("#!/bin/bash\necho loud".into());
        let turn = user_turn(&exchange);
        assert!(turn.contains("Existing script to work from:"));
        assert!(turn.contains("echo loud"));
    }

    #[test]
    fn test_script_mode_selects_script_template() {
        let ctx = Context::new("openai/gpt-4o", true, "backup stuff", false, false);
        let messages = build_messages(&ctx, &host());
        assert!(messages[0].content.contains("standalone script"));
    }
}
