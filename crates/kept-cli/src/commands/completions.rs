use std::io::Write;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

pub fn run_completions(
    shell: CompletionShell,
    output_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let script = render_completions(shell);

    if let Some(path) = output_path {
        std::fs::write(path, &script)?;
        writeln!(out, "{}", path.display())?;
    } else {
        out.write_all(&script)?;
    }

    Ok(())
}

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    let mut script = Vec::new();
    match shell {
        CompletionShell::Bash => render_with(shells::Bash, &mut command, &mut script),
        CompletionShell::Zsh => render_with(shells::Zsh, &mut command, &mut script),
        CompletionShell::Fish => render_with(shells::Fish, &mut command, &mut script),
    }
    script
}

fn render_with<G: Generator>(generator: G, command: &mut clap::Command, script: &mut Vec<u8>) {
    generate(generator, command, "kept", script);
}
