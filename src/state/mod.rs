// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Conversational state machine.
//!
//! The conversation is a loop over [`State`] values. Each handler receives
//! the [`Context`] snapshot by value, owns it for the duration of the state,
//! and returns a [`Transition`] carrying the next state and the (possibly
//! rebuilt) context. The runner never mutates context itself; replacement is
//! wholesale per transition, so there is no shared conversation state to
//! race on.
//!
//! Unknown review-menu keys re-render the current state rather than
//! transitioning, and the terminal states are reached only through an
//! explicit user choice or an unrecoverable generation failure.

pub mod change_model;
pub mod clarification;
pub mod context;
pub mod debug_view;
pub mod execute;
pub mod refine;
pub mod render;
pub mod review;
pub mod save_script;
pub mod script_selection;
pub mod setup;
pub mod user_request;

pub use context::{Context, Exchange, ExchangeKind};

use crate::config::Config;
use crate::error::Result;
use crate::host::HostSnapshot;
use crate::providers::{create_generator, BoxedGenerator};

/// Every reachable phase of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Collect the opening request when none was given on the command line.
    New,
    /// Send the conversation to the model and validate the result.
    UserRequest,
    /// The model asked a clarification question; collect the answer.
    RequestClarification,
    /// Present the generated result and wait for a review-menu keypress.
    UserResponse,
    /// Run the command or saved script in a subprocess.
    ExecuteCommand,
    /// Collect a refinement instruction for the previous result.
    Refine,
    /// Switch the active model mid-conversation.
    ChangeModel,
    /// Persist the generated script to disk.
    SaveScript,
    /// Pick a previously saved script to refine.
    ScriptSelection,
    /// First-run configuration wizard.
    Setup,
    /// Inspect the raw model response.
    Debug,
    /// Terminal state.
    Exit,
}

/// The outcome of one state handler: where to go next, with which context.
pub struct Transition {
    pub next: State,
    pub context: Context,
}

impl Transition {
    pub fn to(next: State, context: Context) -> Self {
        Self { next, context }
    }

    pub fn exit(context: Context) -> Self {
        Self {
            next: State::Exit,
            context,
        }
    }
}

/// Everything a conversation needs besides its [`Context`]: the active
/// generator, the loaded configuration, and the host snapshot embedded in
/// every system instruction.
pub struct Session {
    pub generator: BoxedGenerator,
    pub config: Config,
    pub host: HostSnapshot,
}

impl Session {
    pub fn new(generator: BoxedGenerator, config: Config, host: HostSnapshot) -> Self {
        Self {
            generator,
            config,
            host,
        }
    }

    /// Rebuild the generator for a newly selected model.
    pub fn switch_model(&mut self, model_ref: &str) -> Result<()> {
        self.generator = create_generator(&self.config, model_ref)?;
        Ok(())
    }
}

/// Drive the conversation until it reaches [`State::Exit`].
///
/// Every iteration clears the screen and renders the conversation so far
/// before dispatching, so each state draws on a fresh view rather than
/// appending below stale output.
pub async fn run(session: &mut Session, mut state: State, mut ctx: Context) -> Result<()> {
    loop {
        if state == State::Exit {
            return Ok(());
        }
        crate::ui::clear_screen()?;
        render::render_conversation(&ctx);
        let transition = match state {
            State::New => user_request::handle_new(ctx)?,
            State::UserRequest => user_request::handle(session, ctx).await?,
            State::RequestClarification => clarification::handle(ctx)?,
            State::UserResponse => review::handle(ctx)?,
            State::ExecuteCommand => execute::handle(session, ctx).await?,
            State::Refine => refine::handle(ctx)?,
            State::ChangeModel => change_model::handle(session, ctx)?,
            State::SaveScript => save_script::handle(session, ctx)?,
            State::ScriptSelection => script_selection::handle(session, ctx)?,
            State::Setup => setup::handle(session, ctx)?,
            State::Debug => debug_view::handle(ctx)?,
            State::Exit => return Ok(()),
        };
        state = transition.next;
        ctx = transition.context;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockGenerator;
    use crate::types::{CommandResult, GeneratedResult, GenerationMode};

    fn test_session(generator: MockGenerator) -> Session {
        Session::new(
            Box::new(generator),
            Config::default(),
            HostSnapshot::default(),
        )
    }

    #[tokio::test]
    async fn test_clarifying_result_routes_to_clarification_state() {
        let mut generator = MockGenerator::new();
        generator.expect_model_ref().return_const("test/mock".to_string());
        generator
            .expect_generate()
            .withf(|mode, _| *mode == GenerationMode::Command)
            .returning(|_, _| {
                Ok(GeneratedResult::Command(CommandResult {
                    content: String::new(),
                    explanation: String::new(),
                    changelog: String::new(),
                    clarification_needed: "Which host?".to_string(),
                    destructive: false,
                    should_be_script: false,
                    caution: String::new(),
                    breakdown: Vec::new(),
                }))
            });

        let mut session = test_session(generator);
        let ctx = Context::new("test/mock", false, "ping the server", false, false);
        let transition = user_request::handle(&mut session, ctx).await.unwrap();

        assert_eq!(transition.next, State::RequestClarification);
        assert_eq!(
            transition
                .context
                .current
                .response
                .unwrap()
                .clarification_needed(),
            "Which host?"
        );
    }

    #[tokio::test]
    async fn test_run_clears_and_renders_then_ends_on_generation_failure() {
        let mut generator = MockGenerator::new();
        generator.expect_model_ref().return_const("test/mock".to_string());
        generator
            .expect_generate()
            .returning(|_, _| Err(crate::error::ProviderError::api_message("boom")));

        let mut session = test_session(generator);
        let ctx = Context::new("test/mock", false, "list files", false, false);

        // The loop renders, dispatches once, and terminates on the failure.
        run(&mut session, State::UserRequest, ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_switch_model_rejects_unknown_provider() {
        let mut session = test_session(MockGenerator::new());
        assert!(session.switch_model("nonesuch/model").is_err());
    }

    #[tokio::test]
    async fn test_switch_model_accepts_keyless_ollama() {
        let mut session = test_session(MockGenerator::new());
        session.config.models.push("ollama/llama3.2".to_string());
        session.switch_model("ollama/llama3.2").unwrap();
        assert_eq!(session.generator.model_ref(), "ollama/llama3.2");
    }
}
