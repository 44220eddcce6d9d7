//! `strongroom add-entry`: add a password entry to a folder.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::crypto::{generate_password, CharacterClasses};
use crate::errors::{Result, VaultError};
use crate::vault::Entry;

/// Optional entry fields from the command line.
pub struct EntryFields<'a> {
    pub username: &'a str,
    pub url: &'a str,
    pub notes: &'a str,
    pub password: Option<&'a str>,
}

/// Execute the `add-entry` command.
///
/// `generate` is `Some(None)` for `--generate` without a length.
pub fn execute(
    cli: &Cli,
    vault: &str,
    folder: &str,
    title: &str,
    fields: EntryFields<'_>,
    generate: Option<Option<usize>>,
) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let mut unlocked = ws.unlock(vault)?;

    // Fail before prompting if the folder is missing.
    if unlocked.folder_mut(folder)?.entry_by_title(title).is_some() {
        return Err(VaultError::CommandFailed(format!(
            "folder '{folder}' already has an entry titled '{title}'"
        )));
    }

    let password = match (generate, fields.password) {
        (Some(length), _) => {
            let length = length.unwrap_or(ws.settings.password_length);
            Zeroizing::new(generate_password(length, CharacterClasses::all())?)
        }
        (None, Some(given)) => Zeroizing::new(given.to_string()),
        (None, None) => prompt_entry_password(title)?,
    };

    let entry = Entry::new(title)
        .with_username(fields.username)
        .with_password(password.as_str())
        .with_url(fields.url)
        .with_notes(fields.notes);

    let target = unlocked.folder_mut(folder)?;
    target.entries.push(entry);
    target.touch();

    unlocked.save(&ws.engine)?;

    output::success(&format!("Added entry '{title}' to '{folder}'"));
    if generate.is_some() {
        output::tip(&format!(
            "Run `strongroom get {vault} {folder} {title}` to read the generated password."
        ));
    }
    Ok(())
}

/// Ask for the entry's own password (not the vault password).
fn prompt_entry_password(title: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for '{title}'"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
