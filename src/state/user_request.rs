// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generation state: send the conversation to the model and route on the
//! validated result.

use colored::Colorize;
use tracing::{debug, error};

use super::{Context, Session, State, Transition};
use crate::error::Result;
use crate::prompt;
use crate::types::GenerationMode;
use crate::ui;

/// Collect the opening request when none was supplied on the command line.
pub fn handle_new(mut ctx: Context) -> Result<Transition> {
    if ctx.current.request.trim().is_empty() {
        let mode = if ctx.script_mode { "script" } else { "command" };
        let Some(request) = ui::prompt_line(&format!("Describe the {mode} you need: "), None)?
        else {
            return Ok(Transition::exit(ctx));
        };
        if request.is_empty() {
            return Ok(Transition::exit(ctx));
        }
        ctx.current.request = request;
    }
    Ok(Transition::to(State::UserRequest, ctx))
}

/// Run one generation round against the active model.
///
/// Routing, in order: a command flagged as script-worthy offers the switch
/// to script mode first (accepting regenerates immediately, superseding any
/// clarification question); then a clarification question goes to the
/// clarification state unless the user already declined one this round, in
/// which case the result is treated as best-effort; everything else goes to
/// the review menu. A provider failure ends the conversation with the error
/// reported.
pub async fn handle(session: &mut Session, mut ctx: Context) -> Result<Transition> {
    let mode = if ctx.script_mode {
        GenerationMode::Script
    } else {
        GenerationMode::Command
    };
    let messages = prompt::build_messages(&ctx, &session.host);
    debug!(
        model = session.generator.model_ref(),
        turns = messages.len(),
        "Requesting generation"
    );

    let bar = ui::spinner("Generating...");
    let generated = session.generator.generate(mode, &messages).await;
    bar.finish_and_clear();

    let result = match generated {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Generation failed");
            eprintln!("{} {e}", "Error:".red().bold());
            return Ok(Transition::exit(ctx));
        }
    };

    if let Some(script) = result.as_script() {
        let suggested = if script.script_name.is_empty() {
            ctx.current.request.clone()
        } else {
            script.script_name.clone()
        };
        // No-op on refinement rounds; the first assignment sticks.
        ctx.assign_script_name(&suggested);
    }

    let needs_clarification = !result.clarification_needed().is_empty();
    let suggests_script = offers_script_switch(ctx.script_mode, &result);
    ctx.current.response = Some(result);

    if suggests_script {
        println!();
        println!(
            "{}",
            "This request may be better served by a script.".yellow()
        );
        let answer =
            ui::prompt_line("Generate a script instead? [y/N] ", None)?.unwrap_or_default();
        if answer.eq_ignore_ascii_case("y") {
            ctx.script_mode = true;
            return Ok(Transition::to(State::UserRequest, ctx));
        }
        // Declined: fall through to the normal routing.
    }

    if needs_clarification && !ctx.current.refused_clarification {
        return Ok(Transition::to(State::RequestClarification, ctx));
    }

    Ok(Transition::to(State::UserResponse, ctx))
}

/// Whether this result triggers the script-switch confirmation. It runs
/// before clarification routing, so a script-worthy command offers the
/// switch even when a clarification question is attached.
fn offers_script_switch(script_mode: bool, result: &crate::types::GeneratedResult) -> bool {
    !script_mode && result.as_command().map(|c| c.should_be_script).unwrap_or(false)
}
