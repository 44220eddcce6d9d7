//! `strongroom change-password`: re-encrypt a vault under a new password.
//!
//! Decrypts the tree with the old password, draws a new salt, re-derives
//! the key from the new password, re-encrypts every field and stores the
//! result in place.  The vault keeps the Argon2 settings it was sealed
//! with.

use crate::cli::output;
use crate::cli::{prompt_new_password, prompt_password, Cli, Workspace};
use crate::errors::Result;
use crate::vault::Engine;

/// Execute the `change-password` command.
pub fn execute(cli: &Cli, vault: &str) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let mut located = ws.locate(vault)?;
    let sealed = located.load()?;

    // 1. Open with the current password before asking for a new one.
    output::info("Enter your current vault password.");
    let old_password = prompt_password()?;
    let database = ws.engine.decrypt(&sealed, &old_password)?;

    // 2. Prompt for the new password.
    output::info("Choose your new vault password.");
    let new_password = prompt_new_password()?;

    // 3. Re-seal under a fresh salt and store.
    let rotated = Engine::reseal(database, sealed.kdf, &new_password)?;
    located.cache.put(&located.id, &rotated)?;

    output::success(&format!("Password changed for vault {}", located.id));
    Ok(())
}
