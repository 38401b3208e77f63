// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Script persistence.
//!
//! Each saved script gets its own directory under the configured scripts
//! dir: `<scripts_dir>/<name>/run.sh` plus a `dependencies.txt` manifest
//! when the script declared any.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScriptError;

/// File name of the script body inside its directory.
pub const SCRIPT_FILE: &str = "run.sh";

/// File name of the dependency manifest.
pub const DEPENDENCIES_FILE: &str = "dependencies.txt";

/// Persist a script and its dependency manifest.
pub fn save(
    name: &str,
    content: &str,
    dependencies: &str,
    scripts_dir: &Path,
) -> Result<PathBuf, ScriptError> {
    let dir = scripts_dir.join(name);
    fs::create_dir_all(&dir)?;

    let script_path = dir.join(SCRIPT_FILE);
    fs::write(&script_path, content)
        .map_err(|e| ScriptError::SaveFailed(format!("{}: {e}", script_path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;
    }

    if !dependencies.trim().is_empty() {
        fs::write(dir.join(DEPENDENCIES_FILE), dependencies.trim())?;
    }

    Ok(script_path)
}

/// Load a saved script's body, or `None` when it does not exist.
pub fn load(name: &str, scripts_dir: &Path) -> Result<Option<String>, ScriptError> {
    let path = scripts_dir.join(name).join(SCRIPT_FILE);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?))
}

/// Path a saved script runs from.
pub fn script_path(name: &str, scripts_dir: &Path) -> PathBuf {
    scripts_dir.join(name).join(SCRIPT_FILE)
}

/// List saved script names, newest-modified first.
pub fn list_available(scripts_dir: &Path) -> Result<Vec<String>, ScriptError> {
    if !scripts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(String, std::time::SystemTime)> = Vec::new();
    for entry in fs::read_dir(scripts_dir)? {
        let entry = entry?;
        let script = entry.path().join(SCRIPT_FILE);
        if !script.is_file() {
            continue;
        }
        let modified = script
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
        entries.push((entry.file_name().to_string_lossy().into_owned(), modified));
    }

    entries.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(entries.into_iter().map(|(name, _)| name).collect())
}
