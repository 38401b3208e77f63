// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model switching state.
//!
//! Lists the configured models grouped by provider, swaps the generator,
//! and regenerates the current exchange against the new model. Picking the
//! already active model is a no-op back to the review menu. Any execution
//! output recorded against the old model's result is dropped so it cannot
//! leak into the new model's prompt.

use colored::Colorize;
use tracing::info;

use super::{Context, Session, State, Transition};
use crate::error::Result;
use crate::ui;

pub fn handle(session: &mut Session, mut ctx: Context) -> Result<Transition> {
    let models = &session.config.models;

    println!();
    println!("{}", "Configured models:".cyan().bold());
    let mut last_provider = "";
    for (i, model_ref) in models.iter().enumerate() {
        let provider = model_ref.split('/').next().unwrap_or_default();
        if provider != last_provider {
            println!("  {}", provider.bold());
            last_provider = provider;
        }
        let marker = if *model_ref == ctx.model { " (active)" } else { "" };
        println!("    {}. {model_ref}{marker}", i + 1);
    }
    println!();

    let choice = ui::prompt_line("Switch to: ", None)?.unwrap_or_default();
    if choice.is_empty() {
        return Ok(Transition::exit(ctx));
    }

    let Some(selected) = resolve_choice(&choice, models) else {
        eprintln!("{} no such model: {choice}", "Error:".red().bold());
        return Ok(Transition::to(State::UserResponse, ctx));
    };

    if selected == ctx.model {
        return Ok(Transition::to(State::UserResponse, ctx));
    }

    session.switch_model(&selected)?;
    info!(from = %ctx.model, to = %selected, "Switched model");

    ctx.model = selected;
    ctx.model_changed = true;
    ctx.current.execution = None;
    Ok(Transition::to(State::UserRequest, ctx))
}

/// Accept either a 1-based index into the listing or a full model ref.
fn resolve_choice(choice: &str, models: &[String]) -> Option<String> {
    if let Ok(index) = choice.parse::<usize>() {
        return models.get(index.checked_sub(1)?).cloned();
    }
    models.iter().find(|m| *m == choice).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<String> {
        vec![
            "anthropic/claude-sonnet-4-5".to_string(),
            "openai/gpt-4o".to_string(),
            "ollama/llama3.2".to_string(),
        ]
    }

    #[test]
    fn test_resolve_choice_by_index() {
        assert_eq!(
            resolve_choice("2", &models()),
            Some("openai/gpt-4o".to_string())
        );
        assert_eq!(resolve_choice("0", &models()), None);
        assert_eq!(resolve_choice("4", &models()), None);
    }

    #[test]
    fn test_resolve_choice_by_ref() {
        assert_eq!(
            resolve_choice("ollama/llama3.2", &models()),
            Some("ollama/llama3.2".to_string())
        );
        assert_eq!(resolve_choice("ollama/nope", &models()), None);
    }
}
