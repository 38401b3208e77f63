// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Subprocess execution engine.
//!
//! Runs a generated command or script invocation as a child of the shell.
//! Stdout and stderr stream concurrently to the terminal and into one shared
//! capture buffer; any stderr activity flags the outcome as an error. A
//! Ctrl-C during the run kills only the child, the parent conversation
//! keeps going, and the interrupt reaches the engine only while a child is
//! actually running.
//!
//! Capture is complete before the run resolves: both pipe readers drain to
//! EOF ahead of building the outcome, and invalid UTF-8 is replaced rather
//! than dropped, so binary output cannot truncate the capture. Interleaving
//! between the two streams is whatever the pipe scheduler produced.
//!
//! Signal handling: registering a tokio Ctrl-C listener replaces the
//! process's default SIGINT disposition for good, so the engine does not
//! install one per run. [`install_interrupt_watcher`] starts a single
//! process-wide watcher at startup; it forwards the signal to the running
//! child when one exists and exits the process (as the default handler
//! would have) when none does.

use std::future::Future;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::error::ExecError;
use crate::types::ExecutionOutcome;

/// Set while a child process is running; the watcher forwards SIGINT to the
/// engine instead of exiting the process.
static CHILD_ACTIVE: AtomicBool = AtomicBool::new(false);

static INTERRUPTS: OnceLock<broadcast::Sender<()>> = OnceLock::new();

fn interrupt_channel() -> &'static broadcast::Sender<()> {
    INTERRUPTS.get_or_init(|| broadcast::channel(4).0)
}

/// Start the process-wide Ctrl-C watcher. Call once at startup, inside the
/// runtime.
pub fn install_interrupt_watcher() {
    let sender = interrupt_channel().clone();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if CHILD_ACTIVE.load(Ordering::SeqCst) {
                let _ = sender.send(());
            } else {
                // 128 + SIGINT, what the default disposition reports.
                std::process::exit(130);
            }
        }
    });
}

/// Resolves when the user interrupts a running child. Never resolves
/// spuriously: the channel sender lives for the whole process.
async fn next_interrupt() {
    let mut interrupts = interrupt_channel().subscribe();
    loop {
        match interrupts.recv().await {
            Ok(()) => return,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Marks a child as running for the lifetime of the guard.
struct ActiveChildGuard;

impl ActiveChildGuard {
    fn arm() -> Self {
        CHILD_ACTIVE.store(true, Ordering::SeqCst);
        Self
    }
}

impl Drop for ActiveChildGuard {
    fn drop(&mut self) {
        CHILD_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// What a finished run looked like.
#[derive(Debug)]
pub struct RunResult {
    /// Captured, truncated output plus the error flag.
    pub outcome: ExecutionOutcome,
    /// The user interrupted the child with Ctrl-C.
    pub user_terminated: bool,
    /// Exit code when the child exited normally.
    pub exit_code: Option<i32>,
}

impl RunResult {
    /// Whether the run counts as successful: zero exit or a user-initiated
    /// termination.
    pub fn resolved_ok(&self) -> bool {
        self.user_terminated || self.exit_code == Some(0)
    }
}

/// Run an invocation string under the shell, streaming and capturing output.
///
/// # Errors
///
/// Only a failure to spawn is an `Err`; a non-zero exit comes back as a
/// normal [`RunResult`] with the error flag set, because it flows into the
/// post-execution refinement prompt rather than aborting the conversation.
pub async fn run_invocation(invocation: &str) -> Result<RunResult, ExecError> {
    run_with_interrupt(invocation, next_interrupt()).await
}

/// The engine proper, with the interrupt source injected.
async fn run_with_interrupt<F>(invocation: &str, interrupt: F) -> Result<RunResult, ExecError>
where
    F: Future<Output = ()>,
{
    let shell = if cfg!(windows) { "cmd" } else { "sh" };
    let shell_flag = if cfg!(windows) { "/C" } else { "-c" };

    debug!(invocation, "Spawning child process");

    let mut child = Command::new(shell)
        .arg(shell_flag)
        .arg(invocation)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecError::SpawnFailed(e.to_string()))?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let buffer = Arc::new(Mutex::new(String::new()));
    let stderr_seen = Arc::new(AtomicBool::new(false));

    let out_task = tokio::spawn(pump_stream(stdout, Arc::clone(&buffer), false, None));
    let err_task = tokio::spawn(pump_stream(
        stderr,
        Arc::clone(&buffer),
        true,
        Some(Arc::clone(&stderr_seen)),
    ));

    // The interrupt reaches this run only between arm and drop, so its
    // scope ends with the child on every path.
    let active = ActiveChildGuard::arm();
    tokio::pin!(interrupt);
    let mut user_terminated = false;
    let status = tokio::select! {
        status = child.wait() => status?,
        () = &mut interrupt => {
            user_terminated = true;
            warn!("Interrupt received; terminating child only");
            child.kill().await?;
            child.wait().await?
        }
    };
    drop(active);

    // Completeness before resolution: both readers drain to EOF.
    let _ = out_task.await;
    let _ = err_task.await;

    let exit_code = status.code();
    let error = stderr_seen.load(Ordering::SeqCst) || !matches!(exit_code, Some(0));
    let captured = buffer.lock().await;
    let outcome = ExecutionOutcome::from_captured(&captured, error && !user_terminated);

    debug!(?exit_code, user_terminated, "Child process finished");

    Ok(RunResult {
        outcome,
        user_terminated,
        exit_code,
    })
}

/// Drain one pipe to EOF, echoing to the terminal and appending to the
/// shared capture buffer. Reads raw bytes so invalid UTF-8 is replaced
/// instead of ending the capture early.
async fn pump_stream<R: AsyncRead + Unpin>(
    stream: R,
    buffer: Arc<Mutex<String>>,
    is_stderr: bool,
    seen: Option<Arc<AtomicBool>>,
) {
    let mut reader = BufReader::new(stream);
    let mut chunk = Vec::new();
    loop {
        chunk.clear();
        match reader.read_until(b'\n', &mut chunk).await {
            Ok(0) => break,
            Ok(_) => {}
            // The pipe is gone; nothing more can arrive.
            Err(_) => break,
        }

        let line = String::from_utf8_lossy(&chunk);
        let display = line.trim_end_matches('\n');
        if is_stderr {
            eprintln!("{display}");
        } else {
            println!("{display}");
        }
        if let Some(flag) = &seen {
            flag.store(true, Ordering::SeqCst);
        }
        let mut captured = buffer.lock().await;
        captured.push_str(&line);
        if !line.ends_with('\n') {
            captured.push('\n');
        }
    }
}

/// Assemble the invocation string for a saved script: the script path, one
/// quoted value per declared parameter, then free-form extra arguments.
pub fn assemble_script_invocation(
    script_path: &str,
    parameter_values: &[String],
    extra_args: &str,
) -> String {
    let mut invocation = shell_quote(script_path);
    for value in parameter_values {
        invocation.push(' ');
        invocation.push_str(&shell_quote(value));
    }
    if !extra_args.trim().is_empty() {
        invocation.push(' ');
        invocation.push_str(extra_args.trim());
    }
    invocation
}

/// Single-quote a value for the shell, escaping embedded single quotes.
fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || "-_./".contains(c)) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_CAPTURED_CHARS;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_echo_captures_output() {
        let result = run_invocation("echo hello world").await.unwrap();
        assert!(result.resolved_ok());
        assert_eq!(result.exit_code, Some(0));
        assert!(!result.outcome.error);
        assert!(result.outcome.output.contains("hello world"));
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_flags_error() {
        let result = run_invocation("echo partial output; exit 2").await.unwrap();
        assert!(!result.resolved_ok());
        assert_eq!(result.exit_code, Some(2));
        assert!(result.outcome.error);
        // Output is retained even on failure.
        assert!(result.outcome.output.contains("partial output"));
    }

    #[tokio::test]
    async fn test_run_stderr_flags_error_despite_zero_exit() {
        let result = run_invocation("echo oops >&2; exit 0").await.unwrap();
        assert!(result.resolved_ok());
        assert!(result.outcome.error);
        assert!(result.outcome.output.contains("oops"));
    }

    #[tokio::test]
    async fn test_run_captures_both_streams() {
        let result = run_invocation("echo to-stdout; echo to-stderr >&2").await.unwrap();
        assert!(result.outcome.output.contains("to-stdout"));
        assert!(result.outcome.output.contains("to-stderr"));
    }

    #[tokio::test]
    async fn test_run_non_utf8_output_is_fully_captured() {
        // \370 is not valid UTF-8; the lines around it must survive.
        let result =
            run_invocation(r"printf 'before\n'; printf '\370\n'; printf 'after\n'")
                .await
                .unwrap();
        assert!(result.outcome.output.contains("before"));
        assert!(result.outcome.output.contains("after"));
        assert!(result.outcome.output.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_run_long_output_is_truncated() {
        // ~26 * 200 = 5200 characters of output.
        let result = run_invocation("for i in $(seq 1 200); do echo abcdefghijklmnopqrstuvwxy; done")
            .await
            .unwrap();
        assert!(result.outcome.output.len() < 5000);
        assert!(result.outcome.output.contains("more characters)"));
        assert!(result.outcome.output.len() > MAX_CAPTURED_CHARS);
    }

    #[tokio::test]
    async fn test_interrupt_terminates_child_only() {
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(150)).await;
        };
        let started = std::time::Instant::now();
        // exec keeps sleep in the shell's own process so the kill reaches it.
        let result = run_with_interrupt("echo started; exec sleep 30", interrupt)
            .await
            .unwrap();

        assert!(result.user_terminated);
        assert!(result.resolved_ok());
        assert!(!result.outcome.error);
        assert!(result.outcome.output.contains("started"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_uninterrupted_run_ignores_pending_interrupt_source() {
        // The injected source never fires; the run completes normally.
        let result = run_with_interrupt("echo fine", std::future::pending())
            .await
            .unwrap();
        assert!(!result.user_terminated);
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_run_empty_invocation_succeeds() {
        let result = run_invocation("").await.unwrap();
        assert_eq!(result.exit_code, Some(0));
    }

    #[test]
    fn test_assemble_script_invocation() {
        let invocation = assemble_script_invocation(
            "/scripts/backup-files-a1b2c3d4/run.sh",
            &["my dir".to_string(), "fast".to_string()],
            "--verbose",
        );
        assert_eq!(
            invocation,
            "/scripts/backup-files-a1b2c3d4/run.sh 'my dir' fast --verbose"
        );
    }

    #[test]
    fn test_assemble_script_invocation_no_extras() {
        let invocation = assemble_script_invocation("/s/run.sh", &[], "  ");
        assert_eq!(invocation, "/s/run.sh");
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("plain-value_1.txt"), "plain-value_1.txt");
        assert_eq!(shell_quote(""), "''");
    }
}
