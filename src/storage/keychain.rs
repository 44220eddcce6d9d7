//! Platform secret store backend.
//!
//! Each vault is one credential in the OS keyring:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Keyrings cannot enumerate their entries, so the backend also keeps
//! an index credential holding the known vault ids.

use uuid::Uuid;

use super::{ensure_id_matches, VaultCache, VaultSummary};
use crate::errors::{Result, VaultError};
use crate::vault::EncryptedDatabase;

/// Default service name used in the OS keyring.
pub const SERVICE_NAME: &str = "strongroom";

const INDEX_KEY: &str = "index";

fn entry_key(id: &Uuid) -> String {
    format!("vault:{id}")
}

/// Vaults stored as OS keyring credentials.
#[derive(Debug, Clone)]
pub struct KeychainCache {
    service: String,
}

impl Default for KeychainCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KeychainCache {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom service name, e.g. to isolate test runs.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| VaultError::KeyringError(format!("failed to create keyring entry: {e}")))
    }

    /// Read a credential, `None` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultError::KeyringError(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn write(&self, key: &str, secret: &str) -> Result<()> {
        self.entry(key)?.set_password(secret).map_err(|e| {
            VaultError::KeyringError(format!("failed to store in keyring: {e}"))
        })
    }

    fn index(&self) -> Result<Vec<Uuid>> {
        let Some(raw) = self.read(INDEX_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw)
            .map_err(|e| VaultError::Corrupt(format!("keyring index: {e}")))
    }

    fn write_index(&self, ids: &[Uuid]) -> Result<()> {
        let raw = serde_json::to_string(ids)
            .map_err(|e| VaultError::SerializationError(e.to_string()))?;
        self.write(INDEX_KEY, &raw)
    }
}

impl VaultCache for KeychainCache {
    fn list(&self) -> Result<Vec<VaultSummary>> {
        let mut list = Vec::new();
        for id in self.index()? {
            match self.get(&id) {
                Ok(vault) => list.push(VaultSummary::from(&vault)),
                // Removed behind our back; the index heals on the next put.
                Err(VaultError::NotFound(_)) => {
                    tracing::warn!(vault = %id, "keyring index names a missing vault");
                }
                Err(e) => return Err(e),
            }
        }
        list.sort_by_key(|s| s.id);
        Ok(list)
    }

    fn get(&self, id: &Uuid) -> Result<EncryptedDatabase> {
        let raw = self
            .read(&entry_key(id))?
            .ok_or(VaultError::NotFound(*id))?;
        let vault = EncryptedDatabase::from_json(raw.as_bytes())?;
        if vault.id() != *id {
            return Err(VaultError::Corrupt(format!(
                "credential {id} holds vault {}",
                vault.id()
            )));
        }
        Ok(vault)
    }

    fn put(&mut self, id: &Uuid, vault: &EncryptedDatabase) -> Result<()> {
        ensure_id_matches(id, vault)?;
        let body = String::from_utf8(vault.to_json()?)
            .map_err(|e| VaultError::SerializationError(e.to_string()))?;
        self.write(&entry_key(id), &body)?;

        let mut ids = self.index()?;
        if !ids.contains(id) {
            ids.push(*id);
            ids.sort();
            self.write_index(&ids)?;
        }
        tracing::debug!(vault = %id, service = %self.service, "stored vault credential");
        Ok(())
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        match self.entry(&entry_key(id))?.delete_credential() {
            Ok(()) => {}
            Err(keyring::Error::NoEntry) => return Err(VaultError::NotFound(*id)),
            Err(e) => {
                return Err(VaultError::KeyringError(format!(
                    "failed to delete from keyring: {e}"
                )))
            }
        }

        let mut ids = self.index()?;
        ids.retain(|known| known != id);
        self.write_index(&ids)
    }

    fn exists(&self, id: &Uuid) -> bool {
        matches!(self.read(&entry_key(id)), Ok(Some(_)))
    }
}
