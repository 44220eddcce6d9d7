//! `strongroom get`: print or copy a single entry's password.

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, vault: &str, folder: &str, title: &str, copy: bool) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let mut unlocked = ws.unlock(vault)?;

    let entry = unlocked
        .folder_mut(folder)?
        .entry_by_title(title)
        .ok_or_else(|| VaultError::CommandFailed(format!("no entry titled '{title}' in '{folder}'")))?;

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(entry.password.clone())
            .map_err(|e| VaultError::CommandFailed(format!("clipboard write: {e}")))?;
        output::success(&format!("Copied password for '{title}' to the clipboard"));
    } else {
        // Decrypt and print the password to stdout.
        println!("{}", entry.password);
    }

    Ok(())
}
