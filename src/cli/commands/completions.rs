//! `strongroom completions`: print a shell completion script.
//!
//! The script covers every vault subcommand (`create`, `show`,
//! `add-entry`, `attach`, `change-password`, ...) together with their
//! flags and the `--encryption`/`--storage`/`--kind` values.
//!
//!   strongroom completions bash > ~/.local/share/bash-completion/completions/strongroom
//!   strongroom completions zsh > "${fpath[1]}/_strongroom"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

const BIN_NAME: &str = "strongroom";

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_script(shell, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render the completion script for `shell` into `out`.
pub fn write_script(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    Ok(())
}
