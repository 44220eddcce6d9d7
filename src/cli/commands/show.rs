//! `strongroom show`: decrypt a vault and print its tree.

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let unlocked = ws.unlock(vault)?;
    output::print_database(&unlocked.database);
    Ok(())
}
