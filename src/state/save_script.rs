// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Script persistence state: write the accepted script to disk and hand off
//! to execution.
//!
//! Saving re-runs on every accept, so refinements overwrite the same
//! directory; the name was fixed when the script was first generated.

use colored::Colorize;
use tracing::warn;

use super::{Context, Session, State, Transition};
use crate::error::Result;
use crate::scripts;

pub fn handle(session: &mut Session, ctx: Context) -> Result<Transition> {
    let Some(script) = ctx.current.response.as_ref().and_then(|r| r.as_script()) else {
        return Ok(Transition::exit(ctx));
    };
    let Some(name) = ctx.script_name.as_deref() else {
        return Ok(Transition::exit(ctx));
    };

    match scripts::save(
        name,
        &script.content,
        &script.dependencies,
        &session.config.scripts_dir(),
    ) {
        Ok(path) => {
            println!();
            println!("{} {}", "Saved:".green().bold(), path.display());
            Ok(Transition::to(State::ExecuteCommand, ctx))
        }
        Err(e) => {
            warn!(error = %e, script = name, "Failed to save script");
            eprintln!("{} {e}", "Error:".red().bold());
            Ok(Transition::exit(ctx))
        }
    }
}
