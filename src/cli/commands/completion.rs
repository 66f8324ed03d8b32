//! completion command - Generate shell completion scripts

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell as Target};

use crate::cli::args::{Cli, Shell};

impl From<Shell> for Target {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => Target::Bash,
            Shell::Zsh => Target::Zsh,
            Shell::Fish => Target::Fish,
            Shell::PowerShell => Target::PowerShell,
        }
    }
}

/// Print the completion script for `shell` on stdout.
pub fn completion(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completion(shell, &mut stdout)?;
    stdout.flush().context("Failed to write completion script")
}

/// Write the completion script for `shell`, covering every subcommand and
/// the global entity flags.
fn write_completion<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(Target::from(shell), &mut cmd, name, out);
    Ok(())
}
