// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Review state: present the result and dispatch on a single keypress.
//!
//! Key routing is a pure table in [`action_for_key`] so the gating rules
//! (script conversion only in command mode, breakdown only when present,
//! model switching only with multiple models configured) are testable
//! without a terminal. Unrecognized keys re-render the menu.

use colored::Colorize;
use tracing::debug;

use super::{render, Context, State, Transition};
use crate::clipboard;
use crate::error::Result;
use crate::ui::{self, MenuKey};

/// What one review keypress resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Enter: run the command, or save-then-run the script.
    Accept,
    Copy,
    Refine,
    /// Regenerate the command as a script.
    AsScript,
    Breakdown,
    ChangeModel,
    Debug,
    Quit,
}

/// Resolve a keypress against the actions available for this context.
/// `None` means the key does nothing here.
pub fn action_for_key(key: MenuKey, ctx: &Context) -> Option<ReviewAction> {
    match key {
        MenuKey::Enter => Some(ReviewAction::Accept),
        MenuKey::CtrlC | MenuKey::Char('q') => Some(ReviewAction::Quit),
        MenuKey::Char('c') => Some(ReviewAction::Copy),
        MenuKey::Char('r') => Some(ReviewAction::Refine),
        MenuKey::Char('s') if !ctx.script_mode => Some(ReviewAction::AsScript),
        MenuKey::Char('b') if !ctx.script_mode && render::has_breakdown(ctx) => {
            Some(ReviewAction::Breakdown)
        }
        MenuKey::Char('m') if ctx.has_multiple_models => Some(ReviewAction::ChangeModel),
        MenuKey::Char('d') if ctx.debug => Some(ReviewAction::Debug),
        _ => None,
    }
}

// The runner has already cleared the screen and rendered the conversation
// when this handler runs; it only owns the menu and the breakdown sub-view.
pub fn handle(mut ctx: Context) -> Result<Transition> {
    loop {
        println!("{}", render::menu_line(&ctx));
        let key = ui::read_key()?;
        let Some(action) = action_for_key(key, &ctx) else {
            continue;
        };
        debug!(?action, "Review action selected");

        match action {
            ReviewAction::Accept => {
                let next = if ctx.script_mode {
                    State::SaveScript
                } else {
                    State::ExecuteCommand
                };
                return Ok(Transition::to(next, ctx));
            }
            ReviewAction::Copy => {
                let content = ctx
                    .current
                    .response
                    .as_ref()
                    .map(|r| r.content().to_string())
                    .unwrap_or_default();
                if clipboard::copy(&content) {
                    println!("{}", "Copied to clipboard.".green());
                } else {
                    eprintln!("{}", "Could not access the clipboard.".yellow());
                }
                return Ok(Transition::exit(ctx));
            }
            ReviewAction::Refine => return Ok(Transition::to(State::Refine, ctx)),
            ReviewAction::AsScript => {
                ctx.script_mode = true;
                return Ok(Transition::to(State::UserRequest, ctx));
            }
            ReviewAction::Breakdown => {
                if let Some(cmd) = ctx.current.response.as_ref().and_then(|r| r.as_command()) {
                    ui::clear_screen()?;
                    render::render_breakdown(&cmd.breakdown);
                    ui::read_key()?;
                }
                ui::clear_screen()?;
                render::render_conversation(&ctx);
            }
            ReviewAction::ChangeModel => return Ok(Transition::to(State::ChangeModel, ctx)),
            ReviewAction::Debug => return Ok(Transition::to(State::Debug, ctx)),
            ReviewAction::Quit => return Ok(Transition::exit(ctx)),
        }
    }
}
