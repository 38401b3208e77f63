// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Clipboard access.

use tracing::warn;

/// Copy text to the system clipboard. Returns `false` when no clipboard is
/// available (headless sessions), which the caller reports as a warning.
pub fn copy(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to write clipboard");
                false
            }
        },
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable");
            false
        }
    }
}
