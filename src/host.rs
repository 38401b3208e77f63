// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Host environment snapshot.
//!
//! Gathers a read-only bag of facts about the machine (OS, shell, working
//! directory, project markers, git state, installed tools) once at startup.
//! The snapshot is injected into the system instruction so generated
//! commands fit the host; nothing in the conversation core recomputes it.

use std::path::Path;
use std::process::Command;

/// Project marker files checked in the working directory.
const PROJECT_MARKERS: &[&str] = &[
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
];

/// Tools probed for availability.
const KNOWN_TOOLS: &[&str] = &[
    "git", "docker", "curl", "wget", "jq", "rg", "fd", "tar", "zip", "unzip",
    "python3", "node", "cargo", "make", "ffmpeg",
];

/// A snapshot of host-environment facts.
#[derive(Debug, Clone, Default)]
pub struct HostSnapshot {
    pub os: String,
    pub arch: String,
    pub shell: String,
    pub cwd: String,
    pub project_markers: Vec<String>,
    pub git_branch: Option<String>,
    pub git_dirty: bool,
    pub installed_tools: Vec<String>,
}

impl HostSnapshot {
    /// Probe the current host. All probes are best-effort; failures leave
    /// the corresponding fact empty.
    pub fn gather() -> Self {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let shell = std::env::var("SHELL")
            .ok()
            .and_then(|s| s.rsplit('/').next().map(str::to_string))
            .unwrap_or_else(|| if cfg!(windows) { "cmd".into() } else { "sh".into() });

        let project_markers = PROJECT_MARKERS
            .iter()
            .filter(|m| Path::new(m).exists())
            .map(|m| m.to_string())
            .collect();

        let installed_tools = KNOWN_TOOLS
            .iter()
            .filter(|t| tool_available(t))
            .map(|t| t.to_string())
            .collect();

        let (git_branch, git_dirty) = git_state();

        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            shell,
            cwd,
            project_markers,
            git_branch,
            git_dirty,
            installed_tools,
        }
    }

    /// Render the snapshot as plain lines for the system instruction.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Operating system: {} ({})", self.os, self.arch),
            format!("Shell: {}", self.shell),
            format!("Working directory: {}", self.cwd),
        ];

        if !self.project_markers.is_empty() {
            lines.push(format!(
                "Project markers present: {}",
                self.project_markers.join(", ")
            ));
        }

        if let Some(branch) = &self.git_branch {
            let state = if self.git_dirty { "dirty" } else { "clean" };
            lines.push(format!("Git: on branch {branch} ({state} working tree)"));
        }

        if !self.installed_tools.is_empty() {
            lines.push(format!(
                "Available tools: {}",
                self.installed_tools.join(", ")
            ));
        }

        lines.join("\n")
    }
}

/// Check whether a tool is on PATH.
fn tool_available(name: &str) -> bool {
    let probe = if cfg!(windows) { "where" } else { "which" };
    Command::new(probe)
        .arg(name)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Current git branch and working-tree dirtiness, if inside a repository.
fn git_state() -> (Option<String>, bool) {
    let branch = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());

    if branch.is_none() {
        return (None, false);
    }

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .map(|out| out.status.success() && !out.stdout.is_empty())
        .unwrap_or(false);

    (branch, dirty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_basic_facts() {
        let snapshot = HostSnapshot::gather();
        assert!(!snapshot.os.is_empty());
        assert!(!snapshot.arch.is_empty());
        assert!(!snapshot.shell.is_empty());
    }

    #[test]
    fn test_render_contains_core_lines() {
        let snapshot = HostSnapshot {
            os: "linux".into(),
            arch: "x86_64".into(),
            shell: "bash".into(),
            cwd: "/home/user".into(),
            project_markers: vec!["Cargo.toml".into()],
            git_branch: Some("main".into()),
            git_dirty: true,
            installed_tools: vec!["git".into(), "jq".into()],
        };
        let rendered = snapshot.render();
        assert!(rendered.contains("linux"));
        assert!(rendered.contains("Shell: bash"));
        assert!(rendered.contains("Cargo.toml"));
        assert!(rendered.contains("branch main (dirty"));
        assert!(rendered.contains("git, jq"));
    }
}
