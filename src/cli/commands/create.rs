//! `strongroom create`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, Workspace};
use crate::errors::{Result, VaultError};
use crate::storage::open_cache;
use crate::vault::{Database, Encryption, Header, StorageType};

/// Execute the `create` command.
pub fn execute(
    cli: &Cli,
    name: &str,
    description: &str,
    encryption: Option<&str>,
    storage: Option<&str>,
) -> Result<()> {
    let ws = Workspace::load(cli)?;

    // 1. Resolve cipher and backend, falling back to the configured defaults.
    let encryption: Encryption = match encryption {
        Some(tag) => tag.parse()?,
        None => ws.settings.encryption()?,
    };
    let storage: StorageType = match storage {
        Some(tag) => tag.parse()?,
        None => ws.settings.storage()?,
    };

    // 2. Open the backend before asking for a password.
    let mut cache = open_cache(storage, &ws.vault_dir)?;

    // 3. Build the vault with a fresh salt and seal it.
    let password = prompt_new_password()?;
    let database = Database::new(name, description, Header::generate(encryption, storage));
    if cache.exists(&database.id) {
        return Err(VaultError::AlreadyExists(database.id));
    }
    let sealed = ws.engine.encrypt(&database, &password)?;
    cache.put(&database.id, &sealed)?;

    output::success(&format!(
        "Vault '{name}' created ({encryption}, {storage} storage)"
    ));
    println!("{}", database.id);
    output::tip("Run `strongroom add-folder <VAULT> <NAME>` to add a folder.");

    Ok(())
}
