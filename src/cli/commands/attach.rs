//! `strongroom attach`: import a file as a document, image or video.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{AttachKind, Cli, Workspace};
use crate::errors::{Result, VaultError};
use crate::vault::{Document, Media};

/// Execute the `attach` command.
pub fn execute(
    cli: &Cli,
    vault: &str,
    folder: &str,
    file: &Path,
    kind: AttachKind,
    entry: Option<&str>,
    quality: u32,
) -> Result<()> {
    if entry.is_some() && kind != AttachKind::Document {
        return Err(VaultError::CommandFailed(
            "only documents can be attached to an entry".into(),
        ));
    }

    let data = fs::read(file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| VaultError::CommandFailed(format!("'{}' is not a file", file.display())))?;
    let size = data.len();

    let ws = Workspace::load(cli)?;
    let mut unlocked = ws.unlock(vault)?;
    let target = unlocked.folder_mut(folder)?;

    match (kind, entry) {
        (AttachKind::Document, Some(title)) => {
            let entry = target.entry_by_title_mut(title).ok_or_else(|| {
                VaultError::CommandFailed(format!("no entry titled '{title}' in '{folder}'"))
            })?;
            entry.documents.push(Document::new(&name, file_type(file), data));
            entry.touch();
        }
        (AttachKind::Document, None) => {
            target.documents.push(Document::new(&name, file_type(file), data));
        }
        (AttachKind::Image, _) => target.images.push(Media::new(&name, data, quality)),
        (AttachKind::Video, _) => target.videos.push(Media::new(&name, data, quality)),
    }
    target.touch();

    unlocked.save(&ws.engine)?;

    output::success(&format!("Attached '{name}' ({size} bytes) to '{folder}'"));
    Ok(())
}

/// Lowercased extension, or empty when the file has none.
fn file_type(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
