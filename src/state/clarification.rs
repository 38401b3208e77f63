// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Clarification state: the model asked a question before committing to a
//! result.
//!
//! An answer starts a new clarification exchange and regenerates. A refusal
//! (empty answer or cancel) marks the current exchange refused and proceeds
//! straight to review with whatever the model produced; the refusal flag
//! also keeps any later round for this exchange from routing back here.

use colored::Colorize;

use super::{Context, State, Transition};
use crate::error::Result;
use crate::ui;

// The rendered conversation above already shows the provisional result and
// its changelog; this handler adds only the question.
pub fn handle(mut ctx: Context) -> Result<Transition> {
    let question = ctx
        .current
        .response
        .as_ref()
        .map(|r| r.clarification_needed().to_string())
        .unwrap_or_default();

    println!();
    println!("{} {question}", "Clarification needed:".yellow().bold());
    println!("{}", "(leave empty to skip and review as-is)".dimmed());

    let answer = ui::prompt_line("> ", None)?.unwrap_or_default();

    if answer.is_empty() {
        ctx.current.refused_clarification = true;
        return Ok(Transition::to(State::UserResponse, ctx));
    }

    ctx.begin_clarification(answer);
    Ok(Transition::to(State::UserRequest, ctx))
}
