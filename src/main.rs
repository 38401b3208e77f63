// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shellm main entry point.

use clap::Parser;
use colored::Colorize;

use shellm::config;
use shellm::host::HostSnapshot;
use shellm::providers::create_generator;
use shellm::state::{self, Context, Session, State};

/// Shellm - describe it, review it, run it.
#[derive(Parser)]
#[command(name = "shellm")]
#[command(author, version, about = "Natural language to shell commands", long_about = None)]
struct Cli {
    /// What you want the shell to do
    request: Vec<String>,

    /// Model to use, as provider/model
    #[arg(short, long, env = "SHELLM_MODEL")]
    model: Option<String>,

    /// Generate a script instead of a one-line command
    #[arg(short, long)]
    script: bool,

    /// Pick a previously saved script to refine
    #[arg(long)]
    refine_scripts: bool,

    /// Run the configuration wizard
    #[arg(long)]
    setup: bool,

    /// Offer the raw-result inspection view in the review menu
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    shellm::exec::install_interrupt_watcher();

    let cli = Cli::parse();
    let config = config::load()?;

    let needs_setup = cli.setup || !config.is_configured();

    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());
    if !needs_setup {
        if let Err(e) = config::parse_model_ref(&model) {
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(2);
        }
    }

    let generator = if needs_setup {
        // The wizard swaps in a real generator once the model is configured,
        // so the session starts with a placeholder.
        None
    } else {
        match create_generator(&config, &model) {
            Ok(generator) => Some(generator),
            Err(e) => {
                eprintln!("{} {e}", "Error:".red().bold());
                std::process::exit(if e.is_input_error() { 2 } else { 1 });
            }
        }
    };

    let host = HostSnapshot::gather();
    let request = cli.request.join(" ");
    let script_mode = cli.script || cli.refine_scripts;
    let ctx = Context::new(
        &model,
        script_mode,
        request,
        config.has_multiple_models(),
        cli.debug,
    );

    let initial = if needs_setup {
        State::Setup
    } else if cli.refine_scripts {
        State::ScriptSelection
    } else {
        State::New
    };

    let mut session = match generator {
        Some(generator) => Session::new(generator, config, host),
        None => Session::new(null_generator(), config, host),
    };

    state::run(&mut session, initial, ctx).await
}

/// Placeholder generator for the setup path. The wizard replaces it through
/// `switch_model` before the conversation can generate anything.
fn null_generator() -> shellm::providers::BoxedGenerator {
    use async_trait::async_trait;
    use shellm::error::ProviderError;
    use shellm::providers::Generator;
    use shellm::types::{GeneratedResult, GenerationMode, Message};

    struct Unconfigured;

    #[async_trait]
    impl Generator for Unconfigured {
        async fn generate(
            &self,
            _mode: GenerationMode,
            _messages: &[Message],
        ) -> Result<GeneratedResult, ProviderError> {
            Err(ProviderError::NotConfigured(
                "run setup before generating".to_string(),
            ))
        }

        fn model_ref(&self) -> &str {
            ""
        }
    }

    Box::new(Unconfigured)
}

fn init_tracing() {
    // Only initialize if trace or debug is enabled
    if std::env::var("RUST_LOG").is_ok() {
        // Let env var control logging
        tracing_subscriber::fmt::init();
    } else {
        // Default to WARN level
        tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();
    }
}
