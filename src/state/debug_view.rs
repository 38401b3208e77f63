// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Debug inspection state: show the validated result as pretty-printed JSON.

use colored::Colorize;

use super::{Context, State, Transition};
use crate::error::Result;
use crate::ui;

pub fn handle(ctx: Context) -> Result<Transition> {
    ui::clear_screen()?;
    println!("{}", "Raw result".cyan().bold());

    if let Some(result) = &ctx.current.response {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("(no response yet)");
    }
    if let Some(outcome) = ctx.last_execution() {
        println!();
        println!("{}", "Last execution".cyan().bold());
        println!("{}", serde_json::to_string_pretty(outcome)?);
    }

    println!();
    println!("{}", "Press any key to go back.".dimmed());
    ui::read_key()?;
    Ok(Transition::to(State::UserResponse, ctx))
}
