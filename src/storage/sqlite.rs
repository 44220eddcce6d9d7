//! Embedded structured store backed by SQLite.
//!
//! All vaults share one database at `<vault_dir>/vaults.db`.  Each row
//! keeps the header string in its own column so listing never touches
//! the body.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{ensure_id_matches, VaultCache, VaultSummary};
use crate::errors::{Result, VaultError};
use crate::vault::{EncryptedDatabase, Header};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS vaults (
    id         TEXT PRIMARY KEY,
    header     TEXT NOT NULL,
    body       TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// SQLite-backed vault cache.
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| VaultError::Storage(format!("open {}: {e}", path.display())))?;

        // Set restrictive permissions on the database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Self::with_connection(conn)
    }

    /// A throwaway database that lives as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| VaultError::Storage(format!("open in-memory database: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| VaultError::Storage(format!("create schema: {e}")))?;
        Ok(Self { conn })
    }
}

impl VaultCache for SqliteCache {
    fn list(&self) -> Result<Vec<VaultSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, header FROM vaults ORDER BY id")
            .map_err(|e| VaultError::Storage(format!("list prepare: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| VaultError::Storage(format!("list exec: {e}")))?;

        let mut list = Vec::new();
        for row in rows {
            let (id, header) = row.map_err(|e| VaultError::Storage(format!("row parse: {e}")))?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| VaultError::Corrupt(format!("bad vault id '{id}': {e}")))?;
            list.push(VaultSummary {
                id,
                header: Header::parse(&header)?,
            });
        }

        list.sort_by_key(|s| s.id);
        Ok(list)
    }

    fn get(&self, id: &Uuid) -> Result<EncryptedDatabase> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT header, body FROM vaults WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| VaultError::Storage(format!("get {id}: {e}")))?;

        let (header, body) = row.ok_or(VaultError::NotFound(*id))?;
        let vault = EncryptedDatabase::from_json(body.as_bytes())?;

        if vault.id() != *id {
            return Err(VaultError::Corrupt(format!(
                "row {id} holds vault {}",
                vault.id()
            )));
        }
        if Header::parse(&header)? != *vault.header() {
            return Err(VaultError::Corrupt(
                "stored header disagrees with vault body".into(),
            ));
        }

        Ok(vault)
    }

    fn put(&mut self, id: &Uuid, vault: &EncryptedDatabase) -> Result<()> {
        ensure_id_matches(id, vault)?;

        let body = String::from_utf8(vault.to_json()?)
            .map_err(|e| VaultError::SerializationError(e.to_string()))?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| VaultError::Storage(format!("begin: {e}")))?;
        tx.execute(
            "INSERT INTO vaults (id, header, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                header = excluded.header,
                body = excluded.body,
                updated_at = excluded.updated_at",
            params![
                id.to_string(),
                vault.header().to_string(),
                body,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| VaultError::Storage(format!("put {id}: {e}")))?;
        tx.commit()
            .map_err(|e| VaultError::Storage(format!("commit: {e}")))?;

        tracing::debug!(vault = %id, "stored vault row");
        Ok(())
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM vaults WHERE id = ?1", params![id.to_string()])
            .map_err(|e| VaultError::Storage(format!("delete {id}: {e}")))?;

        if removed == 0 {
            return Err(VaultError::NotFound(*id));
        }
        Ok(())
    }

    fn exists(&self, id: &Uuid) -> bool {
        self.conn
            .query_row(
                "SELECT 1 FROM vaults WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()
            .ok()
            .flatten()
            .is_some()
    }
}
