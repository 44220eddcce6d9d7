//! Storage cache contract and its backends.
//!
//! A cache persists [`EncryptedDatabase`] values keyed by vault id.
//! Plaintext never crosses this boundary: the trait only accepts sealed
//! vaults.  Mutating methods take `&mut self`, so a cache handle has a
//! single writer at a time.
//!
//! Backends:
//! - [`MemoryCache`]: owned in-process map (tests, ephemeral vaults)
//! - [`FileCache`]: one flat file per vault, atomic temp-file + rename
//! - `SqliteCache`: embedded structured store (feature `sqlite-store`)
//! - `KeychainCache`: platform secret store (feature `keyring-store`)

pub mod file;
#[cfg(feature = "keyring-store")]
pub mod keychain;
pub mod memory;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use std::path::Path;

use uuid::Uuid;

use crate::errors::{Result, VaultError};
use crate::vault::{EncryptedDatabase, Header, StorageType};

pub use file::FileCache;
#[cfg(feature = "keyring-store")]
pub use keychain::KeychainCache;
pub use memory::MemoryCache;
#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteCache;

/// File name of the embedded store inside the vault directory.
pub const SQLITE_FILE: &str = "vaults.db";

/// Lightweight listing record: enough to route and unlock a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSummary {
    pub id: Uuid,
    pub header: Header,
}

impl From<&EncryptedDatabase> for VaultSummary {
    fn from(vault: &EncryptedDatabase) -> Self {
        Self {
            id: vault.id(),
            header: vault.header().clone(),
        }
    }
}

/// What every storage backend must provide.
pub trait VaultCache {
    /// Summaries of every stored vault, ordered by id.
    fn list(&self) -> Result<Vec<VaultSummary>>;

    /// Load one vault, or `NotFound`.
    fn get(&self, id: &Uuid) -> Result<EncryptedDatabase>;

    /// Store a vault atomically, replacing any previous version.
    fn put(&mut self, id: &Uuid, vault: &EncryptedDatabase) -> Result<()>;

    /// Remove a vault, or `NotFound`.
    fn delete(&mut self, id: &Uuid) -> Result<()>;

    fn exists(&self, id: &Uuid) -> bool;
}

/// Refuse to file a vault under somebody else's id.
pub(crate) fn ensure_id_matches(id: &Uuid, vault: &EncryptedDatabase) -> Result<()> {
    if *id != vault.id() {
        return Err(VaultError::Storage(format!(
            "refusing to store vault {} under id {id}",
            vault.id()
        )));
    }
    Ok(())
}

/// Open the backend that owns vaults of the given storage type.
pub fn open_cache(storage: StorageType, vault_dir: &Path) -> Result<Box<dyn VaultCache>> {
    match storage {
        StorageType::File => Ok(Box::new(FileCache::open(vault_dir)?)),
        #[cfg(feature = "sqlite-store")]
        StorageType::Sqlite => {
            std::fs::create_dir_all(vault_dir)?;
            Ok(Box::new(SqliteCache::open(&vault_dir.join(SQLITE_FILE))?))
        }
        #[cfg(feature = "keyring-store")]
        StorageType::Keychain => Ok(Box::new(KeychainCache::new())),
        #[allow(unreachable_patterns)]
        other => Err(VaultError::Storage(format!(
            "storage backend '{other}' is not available in this build"
        ))),
    }
}

/// Backends that already hold data for this vault directory.
///
/// Unlike [`open_cache`] this never creates files.
pub fn existing_caches(vault_dir: &Path) -> Vec<(StorageType, Box<dyn VaultCache>)> {
    let mut caches: Vec<(StorageType, Box<dyn VaultCache>)> = Vec::new();

    if vault_dir.is_dir() {
        match FileCache::open(vault_dir) {
            Ok(cache) => caches.push((StorageType::File, Box::new(cache))),
            Err(e) => tracing::warn!(error = %e, "file backend unavailable"),
        }
    }

    #[cfg(feature = "sqlite-store")]
    {
        let db_path = vault_dir.join(SQLITE_FILE);
        if db_path.exists() {
            match SqliteCache::open(&db_path) {
                Ok(cache) => caches.push((StorageType::Sqlite, Box::new(cache))),
                Err(e) => tracing::warn!(error = %e, "sqlite backend unavailable"),
            }
        }
    }

    #[cfg(feature = "keyring-store")]
    caches.push((StorageType::Keychain, Box::new(KeychainCache::new())));

    caches
}
