// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Refinement state: collect an instruction revising the previous result.

use super::{Context, State, Transition};
use crate::error::Result;
use crate::ui;

// The rendered conversation above already shows the previous result and, if
// one exists, the last run's output; this handler only collects the change.
pub fn handle(mut ctx: Context) -> Result<Transition> {
    println!();
    let instruction = ui::prompt_line("How should it change? ", None)?.unwrap_or_default();

    if instruction.is_empty() {
        return Ok(Transition::to(State::UserResponse, ctx));
    }

    let execution = ctx.last_execution().cloned();
    ctx.begin_refinement(instruction, execution);
    Ok(Transition::to(State::UserRequest, ctx))
}
