//! In-memory cache.  Nothing survives the process; useful for tests and
//! for callers that persist elsewhere.

use std::collections::HashMap;

use uuid::Uuid;

use super::{ensure_id_matches, VaultCache, VaultSummary};
use crate::errors::{Result, VaultError};
use crate::vault::EncryptedDatabase;

#[derive(Debug, Default)]
pub struct MemoryCache {
    vaults: HashMap<Uuid, EncryptedDatabase>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

impl VaultCache for MemoryCache {
    fn list(&self) -> Result<Vec<VaultSummary>> {
        let mut list: Vec<VaultSummary> = self.vaults.values().map(VaultSummary::from).collect();
        list.sort_by_key(|s| s.id);
        Ok(list)
    }

    fn get(&self, id: &Uuid) -> Result<EncryptedDatabase> {
        self.vaults
            .get(id)
            .cloned()
            .ok_or(VaultError::NotFound(*id))
    }

    fn put(&mut self, id: &Uuid, vault: &EncryptedDatabase) -> Result<()> {
        ensure_id_matches(id, vault)?;
        self.vaults.insert(*id, vault.clone());
        Ok(())
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        self.vaults
            .remove(id)
            .map(|_| ())
            .ok_or(VaultError::NotFound(*id))
    }

    fn exists(&self, id: &Uuid) -> bool {
        self.vaults.contains_key(id)
    }
}
