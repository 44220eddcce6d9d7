//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::storage::VaultSummary;
use crate::vault::{ContentKind, Database, Folder};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of stored vaults (Id, Encryption, Storage).
///
/// Names are encrypted, so only header data is shown.
pub fn print_vaults_table(vaults: &[VaultSummary]) {
    if vaults.is_empty() {
        info("No vaults here yet.");
        tip("Run `strongroom create <NAME>` to create your first vault.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Encryption", "Storage"]);

    for v in vaults {
        table.add_row(vec![
            v.id.to_string(),
            v.header.encryption.to_string(),
            v.header.storage.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a decrypted vault as an indented tree followed by per-kind counts.
pub fn print_database(db: &Database) {
    println!("{} {}", style(&db.name).bold(), style(db.id).dim());
    if !db.description.is_empty() {
        println!("  {}", style(&db.description).italic());
    }

    for folder in &db.folders {
        print_folder(folder, 1);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Kind", "Count"]);
    for kind in [
        ContentKind::Folder,
        ContentKind::Entry,
        ContentKind::Document,
        ContentKind::Image,
        ContentKind::Video,
    ] {
        table.add_row(vec![kind.to_string(), db.count(kind).to_string()]);
    }
    println!("{table}");
}

fn print_folder(folder: &Folder, depth: usize) {
    let pad = "  ".repeat(depth);
    println!("{pad}{} {}", style("\u{25b8}").cyan(), style(&folder.name).bold());

    let inner = "  ".repeat(depth + 1);
    for entry in &folder.entries {
        let user = if entry.username.is_empty() {
            String::new()
        } else {
            format!(" ({})", entry.username)
        };
        println!("{inner}\u{1f511} {}{}", entry.title, style(user).dim());
        for doc in &entry.documents {
            println!("{inner}  \u{1f4ce} {} [{} bytes]", doc.name, doc.data.len());
        }
    }
    for doc in &folder.documents {
        println!("{inner}\u{1f4c4} {} [{} bytes]", doc.name, doc.data.len());
    }
    for image in &folder.images {
        println!("{inner}\u{1f5bc} {} [q{}]", image.name, image.quality);
    }
    for video in &folder.videos {
        println!("{inner}\u{1f3ac} {} [q{}]", video.name, video.quality);
    }

    for sub in &folder.folders {
        print_folder(sub, depth + 1);
    }
}
