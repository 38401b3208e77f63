// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Saved-script selection state, entered via `--refine-scripts`.
//!
//! The chosen script's body seeds the conversation as the existing script to
//! work from, and its directory name is adopted as-is so refinements write
//! back to the same place.

use colored::Colorize;
use tracing::debug;

use super::{Context, Session, State, Transition};
use crate::error::Result;
use crate::scripts;
use crate::ui;

pub fn handle(session: &mut Session, mut ctx: Context) -> Result<Transition> {
    let scripts_dir = session.config.scripts_dir();
    let available = scripts::list_available(&scripts_dir)?;

    if available.is_empty() {
        println!("No saved scripts in {}.", scripts_dir.display());
        return Ok(Transition::exit(ctx));
    }

    println!("{}", "Saved scripts (newest first):".cyan().bold());
    for (i, name) in available.iter().enumerate() {
        println!("  {}. {name}", i + 1);
    }
    println!();

    let choice = ui::prompt_line("Refine which one? ", None)?.unwrap_or_default();
    let Some(name) = resolve_choice(&choice, &available) else {
        return Ok(Transition::exit(ctx));
    };

    let Some(content) = scripts::load(&name, &scripts_dir)? else {
        eprintln!("{} script body missing for {name}", "Error:".red().bold());
        return Ok(Transition::exit(ctx));
    };
    debug!(script = %name, "Loaded script for refinement");

    let request = if ctx.current.request.trim().is_empty() {
        let Some(request) = ui::prompt_line("What should change? ", None)? else {
            return Ok(Transition::exit(ctx));
        };
        if request.is_empty() {
            return Ok(Transition::exit(ctx));
        }
        request
    } else {
        ctx.current.request.clone()
    };

    ctx.script_mode = true;
    ctx.script_name = Some(name);
    ctx.current.request = request;
    ctx.current.existing_script = Some(content);
    Ok(Transition::to(State::UserRequest, ctx))
}

/// Accept a 1-based index into the listing or an exact script name.
fn resolve_choice(choice: &str, available: &[String]) -> Option<String> {
    if choice.is_empty() {
        return None;
    }
    if let Ok(index) = choice.parse::<usize>() {
        return available.get(index.checked_sub(1)?).cloned();
    }
    available.iter().find(|n| *n == choice).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_choice() {
        let available = vec!["backup-files-a1b2c3d4".to_string(), "say-hi-11223344".to_string()];
        assert_eq!(resolve_choice("1", &available), available.first().cloned());
        assert_eq!(
            resolve_choice("say-hi-11223344", &available),
            available.get(1).cloned()
        );
        assert_eq!(resolve_choice("", &available), None);
        assert_eq!(resolve_choice("3", &available), None);
    }
}
