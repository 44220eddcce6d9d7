//! `strongroom add-folder`: add a folder at the root or under another folder.

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::errors::Result;
use crate::vault::Folder;

/// Execute the `add-folder` command.
pub fn execute(
    cli: &Cli,
    vault: &str,
    name: &str,
    parent: Option<&str>,
    description: &str,
) -> Result<()> {
    let ws = Workspace::load(cli)?;
    let mut unlocked = ws.unlock(vault)?;

    let folder = Folder::new(name).with_description(description);
    match parent {
        Some(parent_name) => {
            let parent = unlocked.folder_mut(parent_name)?;
            parent.folders.push(folder);
            parent.touch();
        }
        None => unlocked.database.folders.push(folder),
    }

    unlocked.save(&ws.engine)?;

    match parent {
        Some(p) => output::success(&format!("Added folder '{name}' under '{p}'")),
        None => output::success(&format!("Added folder '{name}'")),
    }
    Ok(())
}
