//! `strongroom delete`: remove a vault from its backend.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, vault: &str, force: bool) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let mut located = ws.locate(vault)?;
    let id = located.id;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete vault {id}? This cannot be undone"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    located.cache.delete(&id)?;
    output::success(&format!("Deleted vault {id} from {} storage", located.storage));

    Ok(())
}
