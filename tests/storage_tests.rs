//! Integration tests for the storage cache contract and its backends.

use std::fs;

use strongroom::crypto::kdf::MIN_MEMORY_KIB;
use strongroom::crypto::Argon2Params;
use strongroom::errors::VaultError;
use strongroom::storage::{
    existing_caches, open_cache, FileCache, MemoryCache, VaultCache, VaultSummary,
};
use strongroom::vault::{
    Database, EncryptedDatabase, Encryption, Engine, Entry, Folder, Header, StorageType,
};
use tempfile::TempDir;
use uuid::Uuid;

fn engine() -> Engine {
    Engine::with_kdf_params(Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    })
}

fn sealed_vault(storage: StorageType, title: &str) -> EncryptedDatabase {
    let mut db = Database::new("Vault", "", Header::generate(Encryption::Aes256Gcm, storage));
    let mut work = Folder::new("Work");
    work.entries.push(Entry::new(title).with_password("x"));
    db.folders.push(work);
    engine().encrypt(&db, "Secret123!").unwrap()
}

/// The behavior every backend must share.
fn exercise_contract(cache: &mut dyn VaultCache, storage: StorageType) {
    let a = sealed_vault(storage, "Mail");
    let b = sealed_vault(storage, "Bank");
    let (id_a, id_b) = (a.id(), b.id());

    assert!(cache.list().unwrap().is_empty());
    assert!(!cache.exists(&id_a));
    assert!(matches!(cache.get(&id_a), Err(VaultError::NotFound(id)) if id == id_a));

    cache.put(&id_a, &a).unwrap();
    cache.put(&id_b, &b).unwrap();
    assert!(cache.exists(&id_a));
    assert_eq!(cache.get(&id_a).unwrap(), a);

    let mut expected = vec![VaultSummary::from(&a), VaultSummary::from(&b)];
    expected.sort_by_key(|s| s.id);
    assert_eq!(cache.list().unwrap(), expected);

    // Replacing keeps one copy.
    let mut a2 = a.clone();
    a2.vault.name = sealed_vault(storage, "x").vault.name;
    cache.put(&id_a, &a2).unwrap();
    assert_eq!(cache.get(&id_a).unwrap(), a2);
    assert_eq!(cache.list().unwrap().len(), 2);

    // Filing under another id is refused.
    assert!(matches!(
        cache.put(&Uuid::new_v4(), &a),
        Err(VaultError::Storage(_))
    ));

    cache.delete(&id_a).unwrap();
    assert!(!cache.exists(&id_a));
    assert!(matches!(cache.delete(&id_a), Err(VaultError::NotFound(_))));
    assert_eq!(cache.list().unwrap().len(), 1);

    // What comes back still opens.
    let reopened = engine().decrypt(&cache.get(&id_b).unwrap(), "Secret123!").unwrap();
    assert_eq!(reopened.folders[0].entries[0].title, "Bank");
}

#[test]
fn memory_cache_honors_contract() {
    let mut cache = MemoryCache::new();
    exercise_contract(&mut cache, StorageType::File);
    assert_eq!(cache.len(), 1);
}

#[test]
fn file_cache_honors_contract() {
    let dir = TempDir::new().unwrap();
    let mut cache = FileCache::open(dir.path()).unwrap();
    exercise_contract(&mut cache, StorageType::File);
}

#[cfg(feature = "sqlite-store")]
#[test]
fn sqlite_cache_honors_contract() {
    let dir = TempDir::new().unwrap();
    let mut cache = strongroom::storage::SqliteCache::open(&dir.path().join("vaults.db")).unwrap();
    exercise_contract(&mut cache, StorageType::Sqlite);
}

// ---------------------------------------------------------------------------
// FileCache specifics
// ---------------------------------------------------------------------------

#[test]
fn file_cache_writes_one_file_per_vault() {
    let dir = TempDir::new().unwrap();
    let mut cache = FileCache::open(dir.path()).unwrap();
    let vault = sealed_vault(StorageType::File, "Mail");
    cache.put(&vault.id(), &vault).unwrap();

    let path = cache.path_for(&vault.id());
    assert!(path.is_file());
    assert_eq!(path.file_name().unwrap(), format!("{}.vault", vault.id()).as_str());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn flipped_file_byte_is_corrupt_on_get() {
    let dir = TempDir::new().unwrap();
    let mut cache = FileCache::open(dir.path()).unwrap();
    let vault = sealed_vault(StorageType::File, "Mail");
    let id = vault.id();
    cache.put(&id, &vault).unwrap();

    let path = cache.path_for(&id);
    let mut bytes = fs::read(&path).unwrap();
    let idx = bytes.len() - 40;
    bytes[idx] ^= 0x01;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(cache.get(&id), Err(VaultError::Corrupt(_))));
}

#[test]
fn truncated_file_is_corrupt_and_skipped_by_list() {
    let dir = TempDir::new().unwrap();
    let mut cache = FileCache::open(dir.path()).unwrap();
    let good = sealed_vault(StorageType::File, "Mail");
    let bad = sealed_vault(StorageType::File, "Bank");
    cache.put(&good.id(), &good).unwrap();
    cache.put(&bad.id(), &bad).unwrap();

    fs::write(cache.path_for(&bad.id()), b"SRVT").unwrap();

    assert!(matches!(cache.get(&bad.id()), Err(VaultError::Corrupt(_))));
    let listed = cache.list().unwrap();
    assert_eq!(listed, vec![VaultSummary::from(&good)]);
}

#[test]
fn file_cache_ignores_foreign_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    fs::write(dir.path().join("not-a-uuid.vault"), "hello").unwrap();

    let cache = FileCache::open(dir.path()).unwrap();
    assert!(cache.list().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn open_cache_routes_file_storage() {
    let dir = TempDir::new().unwrap();
    let vault_dir = dir.path().join(".strongroom");

    let mut cache = open_cache(StorageType::File, &vault_dir).unwrap();
    let vault = sealed_vault(StorageType::File, "Mail");
    cache.put(&vault.id(), &vault).unwrap();

    assert!(vault_dir.join(format!("{}.vault", vault.id())).is_file());
}

#[cfg(feature = "sqlite-store")]
#[test]
fn open_cache_routes_sqlite_storage() {
    let dir = TempDir::new().unwrap();
    let vault_dir = dir.path().join(".strongroom");

    let mut cache = open_cache(StorageType::Sqlite, &vault_dir).unwrap();
    let vault = sealed_vault(StorageType::Sqlite, "Mail");
    cache.put(&vault.id(), &vault).unwrap();

    assert!(vault_dir.join(strongroom::storage::SQLITE_FILE).is_file());
    assert!(!vault_dir.join(format!("{}.vault", vault.id())).exists());
}

#[test]
fn existing_caches_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let vault_dir = dir.path().join("missing");

    let caches = existing_caches(&vault_dir);
    assert!(caches.iter().all(|(storage, _)| *storage == StorageType::Keychain));
    assert!(!vault_dir.exists());
}

#[cfg(feature = "sqlite-store")]
#[test]
fn existing_caches_finds_file_and_sqlite_vaults() {
    let dir = TempDir::new().unwrap();
    let vault_dir = dir.path().join(".strongroom");

    let file_vault = sealed_vault(StorageType::File, "Mail");
    let sql_vault = sealed_vault(StorageType::Sqlite, "Bank");
    open_cache(StorageType::File, &vault_dir)
        .unwrap()
        .put(&file_vault.id(), &file_vault)
        .unwrap();
    open_cache(StorageType::Sqlite, &vault_dir)
        .unwrap()
        .put(&sql_vault.id(), &sql_vault)
        .unwrap();

    let mut found = Vec::new();
    for (storage, cache) in existing_caches(&vault_dir) {
        if storage == StorageType::Keychain {
            continue;
        }
        for summary in cache.list().unwrap() {
            found.push((storage, summary.id));
        }
    }
    found.sort_by_key(|(_, id)| *id);

    let mut expected = vec![
        (StorageType::File, file_vault.id()),
        (StorageType::Sqlite, sql_vault.id()),
    ];
    expected.sort_by_key(|(_, id)| *id);
    assert_eq!(found, expected);
}
