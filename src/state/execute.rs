// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Execution state: run the accepted result and offer a refinement round.
//!
//! Commands run as given; scripts run from their saved path with parameter
//! values collected up front. The run's outcome is recorded on the current
//! exchange so a follow-up refinement carries the captured output back to
//! the model. A failing run prefills the refinement prompt with
//! "fix the errors".

use colored::Colorize;
use tracing::warn;

use super::{Context, Session, State, Transition};
use crate::error::Result;
use crate::exec;
use crate::scripts;
use crate::types::GeneratedResult;
use crate::ui;

pub async fn handle(session: &mut Session, mut ctx: Context) -> Result<Transition> {
    let Some(invocation) = build_invocation(session, &ctx)? else {
        // The user backed out of a destructive command or cancelled
        // parameter entry.
        return Ok(Transition::to(State::UserResponse, ctx));
    };

    println!();
    println!("{} {}", "Running:".cyan().bold(), invocation);
    println!();

    let run = match exec::run_invocation(&invocation).await {
        Ok(run) => run,
        Err(e) => {
            warn!(error = %e, "Failed to start the process");
            eprintln!("{} {e}", "Error:".red().bold());
            return Ok(Transition::exit(ctx));
        }
    };

    println!();
    println!("{}", status_line(&run));

    let failed = run.outcome.error;
    ctx.record_execution(run.outcome);

    // One more round, or done.
    let prefill = failed.then_some("fix the errors");
    let instruction = ui::prompt_line("Refine (Enter to finish): ", prefill)?.unwrap_or_default();

    if instruction.is_empty() {
        println!();
        println!("To run it again later:");
        println!("  {}", invocation.bold());
        return Ok(Transition::exit(ctx));
    }

    let execution = ctx.last_execution().cloned();
    ctx.begin_refinement(instruction, execution);
    Ok(Transition::to(State::UserRequest, ctx))
}

/// One-line verdict for a finished run. An interrupt stops only the child,
/// so the message says the conversation itself is still going.
fn status_line(run: &exec::RunResult) -> String {
    if run.user_terminated {
        format!(
            "{} the command was stopped; shellm keeps running.",
            "Interrupted:".yellow().bold()
        )
    } else if run.resolved_ok() && !run.outcome.error {
        "Done.".green().to_string()
    } else {
        let code = run
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("{} exit code {code}", "Failed:".red().bold())
    }
}

/// Assemble what will actually be handed to the shell, or `None` when the
/// user backs out.
fn build_invocation(session: &Session, ctx: &Context) -> Result<Option<String>> {
    let Some(result) = &ctx.current.response else {
        return Ok(None);
    };

    match result {
        GeneratedResult::Script(script) => {
            let name = ctx.script_name.as_deref().unwrap_or_default();
            let path = scripts::script_path(name, &session.config.scripts_dir());

            let mut values = Vec::with_capacity(script.parameters.len());
            for param in &script.parameters {
                let label = if param.required {
                    format!("{}: ", param.name)
                } else {
                    format!("{} (optional): ", param.name)
                };
                let Some(value) = ui::prompt_line(&label, param.default_value.as_deref())? else {
                    return Ok(None);
                };
                if value.is_empty() && param.required {
                    eprintln!("{} {} is required.", "Error:".red().bold(), param.name);
                    return Ok(None);
                }
                values.push(value);
            }
            // Skipped optional parameters at the tail are omitted rather
            // than passed as empty positionals.
            while values.last().is_some_and(String::is_empty) {
                values.pop();
            }

            let extra = if script.has_parameters || !script.parameters.is_empty() {
                ui::prompt_line("Extra arguments (optional): ", None)?.unwrap_or_default()
            } else {
                String::new()
            };

            Ok(Some(exec::assemble_script_invocation(
                &path.to_string_lossy(),
                &values,
                &extra,
            )))
        }
        GeneratedResult::Command(command) => {
            if command.destructive {
                println!();
                println!(
                    "{} {}",
                    "Warning:".red().bold(),
                    "this command is potentially destructive.".red()
                );
                let answer = ui::prompt_line("Run it anyway? [y/N] ", None)?.unwrap_or_default();
                if !answer.eq_ignore_ascii_case("y") {
                    return Ok(None);
                }
            }
            Ok(Some(command.content.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::RunResult;
    use crate::types::ExecutionOutcome;

    fn run_result(user_terminated: bool, exit_code: Option<i32>, error: bool) -> RunResult {
        RunResult {
            outcome: ExecutionOutcome {
                output: String::new(),
                error,
            },
            user_terminated,
            exit_code,
        }
    }

    #[test]
    fn test_status_line_says_shellm_survives_an_interrupt() {
        let line = status_line(&run_result(true, None, false));
        assert!(line.contains("Interrupted"));
        assert!(line.contains("shellm keeps running"));
    }

    #[test]
    fn test_status_line_success_and_failure() {
        assert!(status_line(&run_result(false, Some(0), false)).contains("Done"));
        assert!(status_line(&run_result(false, Some(2), true)).contains("exit code 2"));
        assert!(status_line(&run_result(false, None, true)).contains("exit code unknown"));
    }
}
