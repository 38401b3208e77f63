// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! First-run setup wizard.
//!
//! Collects a default model, stores the provider credentials, and writes the
//! config file. Runs when the config is missing or empty, or on `--setup`.

use std::str::FromStr;

use colored::Colorize;
use tracing::info;

use super::{Context, Session, State, Transition};
use crate::config::{self, parse_model_ref, ProviderSettings};
use crate::error::Result;
use crate::providers::ProviderKind;
use crate::ui;

pub fn handle(session: &mut Session, mut ctx: Context) -> Result<Transition> {
    println!("{}", "Setup".cyan().bold());
    println!("Models are named as provider/model, e.g. anthropic/claude-sonnet-4-5.");
    println!();

    let model_ref = loop {
        let Some(entered) = ui::prompt_line("Default model: ", None)? else {
            return Ok(Transition::exit(ctx));
        };
        match parse_model_ref(&entered) {
            Ok(_) => break entered,
            Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
        }
    };
    let (provider_name, _) = parse_model_ref(&model_ref)?;
    let provider_name = provider_name.to_string();

    let mut settings = ProviderSettings::default();
    if let Ok(kind) = ProviderKind::from_str(&provider_name) {
        if kind.requires_api_key() {
            let env_hint = kind
                .api_key_env()
                .map(|var| format!(" (empty to use ${var})"))
                .unwrap_or_default();
            settings.api_key = ui::prompt_line(&format!("API key{env_hint}: "), None)?
                .filter(|k| !k.is_empty());
        }
        let base_prompt = format!("Base URL [{}]: ", kind.default_base_url());
        settings.base_url = ui::prompt_line(&base_prompt, None)?.filter(|u| !u.is_empty());
    } else {
        settings.api_key = ui::prompt_line("API key (optional): ", None)?.filter(|k| !k.is_empty());
        settings.base_url = ui::prompt_line("Base URL: ", None)?.filter(|u| !u.is_empty());
    }

    let config = &mut session.config;
    config.default_model = model_ref.clone();
    if !config.models.contains(&model_ref) {
        config.models.push(model_ref.clone());
    }
    config.providers.insert(provider_name, settings);
    config::save(config)?;

    info!(model = %model_ref, "Configuration written");
    println!();
    println!("{} default model is {model_ref}.", "Configured:".green().bold());

    // A request typed alongside --setup (or before first-run setup kicked
    // in) flows straight into a conversation with the new model.
    match next_state(&ctx.current.request) {
        State::Exit => {
            println!("Run shellm again with a request to get started.");
            Ok(Transition::exit(ctx))
        }
        next => {
            session.switch_model(&model_ref)?;
            ctx.model = model_ref;
            ctx.has_multiple_models = session.config.has_multiple_models();
            Ok(Transition::to(next, ctx))
        }
    }
}

/// Where setup hands off: into a conversation when a request is already
/// pending, otherwise out with a hint.
fn next_state(pending_request: &str) -> State {
    if pending_request.trim().is_empty() {
        State::Exit
    } else {
        State::New
    }
}
