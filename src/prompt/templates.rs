// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! System instruction templates.

use crate::host::HostSnapshot;
use crate::types::GenerationMode;

/// Build the mode-specific system instruction with the host snapshot
/// embedded.
pub fn system_instruction(mode: GenerationMode, host: &HostSnapshot) -> String {
    match mode {
        GenerationMode::Command => command_instruction(host),
        GenerationMode::Script => script_instruction(host),
    }
}

fn command_instruction(host: &HostSnapshot) -> String {
    format!(
        "You are a shell command generator. Given a plain-English request, \
         produce a single shell command that accomplishes it on this machine.\n\
         \n\
         Host environment:\n{}\n\
         \n\
         Rules:\n\
         - Produce exactly one command line; pipes and && chains are fine.\n\
         - Prefer tools listed as available; never assume others.\n\
         - Set destructive=true whenever the command can delete or overwrite data.\n\
         - Set should_be_script=true when the request needs branching, loops \
           over many steps, or error handling that does not fit one line.\n\
         - If the request is ambiguous in a way that changes the command, ask \
           one question via clarification_needed instead of guessing.\n\
         - If the user declined to answer a clarification, produce your best \
           interpretation anyway and leave clarification_needed empty.\n\
         - On refinement rounds, describe your changes in changelog.",
        host.render()
    )
}

fn script_instruction(host: &HostSnapshot) -> String {
    format!(
        "You are a shell script generator. Given a plain-English request, \
         produce a complete standalone script for this machine.\n\
         \n\
         Host environment:\n{}\n\
         \n\
         Rules:\n\
         - Start with a shebang and exit non-zero on failure.\n\
         - Declare every user-facing input as a parameter with a clear \
           description; positional order must match the parameters list.\n\
         - List external packages the script needs in dependencies, \
           comma-separated; leave it empty when only standard tools are used.\n\
         - Suggest a short descriptive script_name.\n\
         - If the request is ambiguous in a way that changes the script, ask \
           one question via clarification_needed instead of guessing.\n\
         - If the user declined to answer a clarification, produce your best \
           interpretation anyway and leave clarification_needed empty.\n\
         - On refinement rounds, describe your changes in changelog.",
        host.render()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_embed_host_facts() {
        let host = HostSnapshot {
            os: "linux".into(),
            arch: "x86_64".into(),
            shell: "zsh".into(),
            cwd: "/srv/app".into(),
            ..Default::default()
        };

        let command = system_instruction(GenerationMode::Command, &host);
        assert!(command.contains("Shell: zsh"));
        assert!(command.contains("single shell command"));

        let script = system_instruction(GenerationMode::Script, &host);
        assert!(script.contains("/srv/app"));
        assert!(script.contains("standalone script"));
    }
}
