//! `strongroom list`: show every vault in the vault directory.

use crate::cli::output;
use crate::cli::{Cli, Workspace};
use crate::errors::Result;
use crate::storage::existing_caches;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ws = Workspace::load(cli)?;

    let mut vaults = Vec::new();
    for (_, cache) in existing_caches(&ws.vault_dir) {
        vaults.extend(cache.list()?);
    }
    vaults.sort_by_key(|v| v.id);

    output::print_vaults_table(&vaults);
    Ok(())
}
