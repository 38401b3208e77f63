// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Conversation context model.
//!
//! [`Context`] is the accumulated state of one conversation: the exchange
//! under construction, the completed history, the active model, and the mode
//! flags. It is pure data; handlers own a snapshot, derive the next one, and
//! return it to the runner. Nothing here is shared or mutated in place
//! across states.
//!
//! Invariants:
//! - `history` never contains the in-progress `current` exchange; an
//!   exchange moves into history only when a new one begins.
//! - `script_name` is assigned exactly once per script lineage and never
//!   regenerated on refinement.
//! - Exchange kinds follow `prompt → (clarification | refinement)*`.

use crate::types::{ExecutionOutcome, GeneratedResult};

/// How an exchange's request text should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    /// The user's original request.
    Prompt,
    /// An answer to a model-initiated clarification question.
    Clarification,
    /// A user-initiated revision of the previous result.
    Refinement,
}

/// One user request/model response pair, possibly with execution output.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The raw user text for this exchange (request, answer, or instruction).
    pub request: String,
    /// A previously saved script being refined, present only when the
    /// conversation started from script selection.
    pub existing_script: Option<String>,
    /// The model's validated result, once a generation round completed.
    pub response: Option<GeneratedResult>,
    /// The user declined to answer a clarification question this round.
    pub refused_clarification: bool,
    pub kind: ExchangeKind,
    /// Captured output of the last execution of this exchange's result.
    pub execution: Option<ExecutionOutcome>,
}

impl Exchange {
    /// Create the opening exchange of a conversation.
    pub fn prompt(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            existing_script: None,
            response: None,
            refused_clarification: false,
            kind: ExchangeKind::Prompt,
            execution: None,
        }
    }

    /// Create an exchange answering a clarification question.
    pub fn clarification(answer: impl Into<String>) -> Self {
        Self {
            request: answer.into(),
            existing_script: None,
            response: None,
            refused_clarification: false,
            kind: ExchangeKind::Clarification,
            execution: None,
        }
    }

    /// Create a refinement exchange, optionally carrying the output of the
    /// previous run as context for the model.
    pub fn refinement(instruction: impl Into<String>, execution: Option<ExecutionOutcome>) -> Self {
        Self {
            request: instruction.into(),
            existing_script: None,
            response: None,
            refused_clarification: false,
            kind: ExchangeKind::Refinement,
            execution,
        }
    }
}

/// The conversation's accumulated state, threaded through every transition.
#[derive(Debug, Clone)]
pub struct Context {
    /// Currently selected `provider/model` identifier.
    pub model: String,
    /// Script generation instead of single-command generation.
    pub script_mode: bool,
    /// The exchange under construction.
    pub current: Exchange,
    /// Completed exchanges, oldest first. Append-only within a session.
    pub history: Vec<Exchange>,
    /// Assigned once at first successful script generation; stable across
    /// refinements.
    pub script_name: Option<String>,
    /// Whether model switching is offered in the review menu.
    pub has_multiple_models: bool,
    /// Set when the model was switched mid-conversation.
    pub model_changed: bool,
    /// Whether the debug inspection view is offered.
    pub debug: bool,
}

impl Context {
    /// Create the context for a fresh conversation.
    pub fn new(
        model: impl Into<String>,
        script_mode: bool,
        request: impl Into<String>,
        has_multiple_models: bool,
        debug: bool,
    ) -> Self {
        Self {
            model: model.into(),
            script_mode,
            current: Exchange::prompt(request),
            history: Vec::new(),
            script_name: None,
            has_multiple_models,
            model_changed: false,
            debug,
        }
    }

    /// Archive the current exchange and start a clarification-answer
    /// exchange.
    pub fn begin_clarification(&mut self, answer: impl Into<String>) {
        let finished = std::mem::replace(&mut self.current, Exchange::clarification(answer));
        self.history.push(finished);
    }

    /// Archive the current exchange and start a refinement exchange carrying
    /// the given instruction and prior execution output.
    pub fn begin_refinement(
        &mut self,
        instruction: impl Into<String>,
        execution: Option<ExecutionOutcome>,
    ) {
        let finished =
            std::mem::replace(&mut self.current, Exchange::refinement(instruction, execution));
        self.history.push(finished);
    }

    /// Assign the script name from the model's suggestion, once. Later calls
    /// are no-ops so refinements keep the name.
    pub fn assign_script_name(&mut self, suggested: &str) {
        if self.script_name.is_none() {
            self.script_name = Some(unique_script_name(suggested));
        }
    }

    /// Record the outcome of executing the current exchange's result.
    pub fn record_execution(&mut self, outcome: ExecutionOutcome) {
        self.current.execution = Some(outcome);
    }

    /// Execution output of the current exchange, if any.
    pub fn last_execution(&self) -> Option<&ExecutionOutcome> {
        self.current.execution.as_ref()
    }
}

/// Normalize a model-suggested name to a lowercase hyphenated token set and
/// append an 8-hex-character random suffix, so saved script directories
/// never collide.
pub fn unique_script_name(suggested: &str) -> String {
    let base = normalize_name(suggested);
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
    format!("{base}-{suffix}")
}

fn normalize_name(suggested: &str) -> String {
    let mut out = String::with_capacity(suggested.len());
    let mut last_hyphen = true; // suppress a leading hyphen
    for ch in suggested.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "script".to_string()
    } else {
        trimmed.to_string()
    }
}
