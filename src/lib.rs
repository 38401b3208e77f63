// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shellm - natural language to shell commands and scripts.
//!
//! A conversational CLI that turns a plain-language request into a validated
//! shell command or script via an LLM, lets the user review, refine, and
//! execute it, and persists generated scripts for later reuse.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`types`] - Core type definitions (Message, GeneratedResult, ExecutionOutcome)
//! - [`error`] - Error types and result alias
//! - [`config`] - Configuration loading and model references
//! - [`providers`] - Generation providers (Anthropic, OpenAI-compatible, Ollama)
//! - [`prompt`] - System instructions, conversation assembly, and result schemas
//! - [`state`] - The conversational state machine and its context model
//! - [`exec`] - Subprocess execution with concurrent capture
//! - [`scripts`] - Saved-script persistence
//! - [`host`] - Host environment snapshot embedded in prompts
//! - [`ui`] - Terminal interaction (raw-mode keys, line prompts, spinner)
//! - [`clipboard`] - System clipboard access

pub mod clipboard;
pub mod config;
pub mod error;
pub mod exec;
pub mod host;
pub mod prompt;
pub mod providers;
pub mod scripts;
pub mod state;
pub mod types;
pub mod ui;

pub use error::Result;
pub use state::{Context, Session, State};
pub use types::{GeneratedResult, GenerationMode, Message};

/// Shellm version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
