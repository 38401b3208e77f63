// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Result presentation for the review menu.

use colored::Colorize;

use super::Context;
use crate::types::{BreakdownStep, GeneratedResult};

/// Print the whole conversation: the original request, one line per
/// completed round, then the current result in full. An untouched context
/// (no request, no history, no result) prints nothing, so the runner can
/// call this unconditionally before entry states like setup.
pub fn render_conversation(ctx: &Context) {
    if ctx.history.is_empty() && ctx.current.request.is_empty() && ctx.current.response.is_none() {
        return;
    }
    for exchange in &ctx.history {
        println!("{} {}", ">".dimmed(), exchange.request.dimmed());
        if let Some(response) = &exchange.response {
            let first_line = response.content().lines().next().unwrap_or_default();
            println!("  {}", first_line.dimmed());
        }
    }
    println!("{} {}", ">".cyan().bold(), ctx.current.request.bold());
    render_result(ctx);
    if let Some(outcome) = ctx.last_execution() {
        let label = if outcome.error {
            "Last run (failed):".red().bold()
        } else {
            "Last run:".cyan().bold()
        };
        println!("{label}");
        println!("{}", outcome.output);
        println!();
    }
}

/// Print the current result: content block, explanation, and any advisory
/// flags the model set.
pub fn render_result(ctx: &Context) {
    let Some(result) = &ctx.current.response else {
        return;
    };

    println!();
    match result {
        GeneratedResult::Command(cmd) => {
            println!("{}", cmd.content.green().bold());
            println!();
            println!("{}", cmd.explanation);
            if cmd.destructive {
                println!();
                println!(
                    "{} {}",
                    "Warning:".red().bold(),
                    "this command is potentially destructive.".red()
                );
            }
            if !cmd.caution.is_empty() {
                println!();
                println!("{} {}", "Caution:".yellow().bold(), cmd.caution);
            }
            if cmd.should_be_script && !ctx.script_mode {
                println!();
                println!(
                    "{}",
                    "This request may be better served by a script (press 's').".yellow()
                );
            }
        }
        GeneratedResult::Script(script) => {
            if let Some(name) = &ctx.script_name {
                println!("{} {}", "Script:".cyan().bold(), name);
                println!();
            }
            println!("{}", script.content.green());
            println!();
            println!("{}", script.explanation);
            if !script.parameters.is_empty() {
                println!();
                println!("{}", "Parameters:".cyan().bold());
                for param in &script.parameters {
                    let required = if param.required { "" } else { " (optional)" };
                    println!("  {}{} - {}", param.name.bold(), required, param.description);
                }
            }
            if !script.dependencies.is_empty() {
                println!();
                println!("{} {}", "Dependencies:".cyan().bold(), script.dependencies);
            }
        }
    }

    let changelog = result.changelog();
    if !changelog.is_empty() {
        println!();
        println!("{} {}", "Changes:".cyan().bold(), changelog);
    }
    println!();
}

/// Print the numbered command breakdown sub-view.
pub fn render_breakdown(steps: &[BreakdownStep]) {
    println!();
    println!("{}", "Breakdown:".cyan().bold());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step.command.green());
        println!("     {}", step.description);
    }
    println!();
    println!("{}", "Press any key to go back.".dimmed());
}

/// Build the single-line review menu matching the actions available for
/// this context.
pub fn menu_line(ctx: &Context) -> String {
    let mut parts: Vec<String> = Vec::new();
    if ctx.script_mode {
        parts.push(format!("{} save and run", "[Enter]".bold()));
    } else {
        parts.push(format!("{} run", "[Enter]".bold()));
    }
    parts.push(format!("{} copy", "[c]".bold()));
    parts.push(format!("{} refine", "[r]".bold()));
    if !ctx.script_mode {
        parts.push(format!("{} as script", "[s]".bold()));
        if has_breakdown(ctx) {
            parts.push(format!("{} breakdown", "[b]".bold()));
        }
    }
    if ctx.has_multiple_models {
        parts.push(format!("{} model", "[m]".bold()));
    }
    if ctx.debug {
        parts.push(format!("{} debug", "[d]".bold()));
    }
    parts.push(format!("{} quit", "[q]".bold()));
    parts.join("  ")
}

/// Whether the current result carries a non-empty command breakdown.
pub fn has_breakdown(ctx: &Context) -> bool {
    ctx.current
        .response
        .as_ref()
        .and_then(|r| r.as_command())
        .map(|c| !c.breakdown.is_empty())
        .unwrap_or(false)
}
