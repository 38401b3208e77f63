// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Terminal interaction helpers.
//!
//! Raw-mode input capture is scoped: [`read_key`] acquires raw mode, waits
//! for exactly one keypress, and restores the terminal via [`RawModeGuard`]'s
//! `Drop` on every exit path. Only one capture can be active at a time
//! because each wait owns its guard for its full duration.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// One resolved keypress from the review menu wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Enter,
    Char(char),
    CtrlC,
}

/// Scoped raw-mode acquisition. Raw mode is released on drop, so the
/// terminal is restored on every exit path, including errors.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Wait for exactly one keypress and resolve it to a [`MenuKey`].
///
/// Every event that is not a key press (releases, resizes, mouse) is
/// ignored; the wait resolves on the first press.
pub fn read_key() -> io::Result<MenuKey> {
    let _guard = RawModeGuard::acquire()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                if let KeyCode::Char('c') = key.code {
                    return Ok(MenuKey::CtrlC);
                }
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(MenuKey::Enter),
                KeyCode::Char(c) => return Ok(MenuKey::Char(c.to_ascii_lowercase())),
                _ => continue,
            }
        }
    }
}

/// Read one line of input with an optional prefilled value.
///
/// Returns `Ok(None)` when the user cancels (Ctrl-C or Ctrl-D); callers
/// treat that the same as an empty answer or route to their fallback state.
pub fn prompt_line(prompt: &str, initial: Option<&str>) -> io::Result<Option<String>> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let result = match initial {
        Some(text) => editor.readline_with_initial(prompt, (text, "")),
        None => editor.readline(prompt),
    };

    match result {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}

/// Show a spinner while a long operation runs. Caller finishes it.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template is valid"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

/// Clear the screen and move the cursor home.
pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_key_equality() {
        assert_eq!(MenuKey::Char('r'), MenuKey::Char('r'));
        assert_ne!(MenuKey::Char('r'), MenuKey::Enter);
    }

    #[test]
    fn test_spinner_builds() {
        let bar = spinner("Generating...");
        bar.finish_and_clear();
    }
}
