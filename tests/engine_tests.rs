//! Integration tests for the encryption and decryption engines.

use strongroom::crypto::kdf::MIN_MEMORY_KIB;
use strongroom::crypto::Argon2Params;
use strongroom::errors::VaultError;
use strongroom::storage::{FileCache, VaultCache};
use strongroom::vault::{
    ContentKind, Database, Document, EncryptedDatabase, Encryption, Engine, Entry, Folder, Header,
    Media, Sealed, StorageType, TocItem,
};
use tempfile::TempDir;

fn engine() -> Engine {
    Engine::with_kdf_params(Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    })
}

/// Vault / Work / Mail, as a user would create it.
fn mail_vault(storage: StorageType) -> Database {
    let mut db = Database::new("Vault", "", Header::generate(Encryption::Aes256Gcm, storage));
    let mut work = Folder::new("Work");
    work.entries.push(
        Entry::new("Mail")
            .with_username("a@b.com")
            .with_password("x"),
    );
    db.folders.push(work);
    db
}

/// A tree touching every entity kind, three folders deep.
fn rich_vault(encryption: Encryption) -> Database {
    let mut db = Database::new(
        "Family",
        "shared household secrets",
        Header::generate(encryption, StorageType::File),
    );

    let mut bank = Folder::new("Bank").with_description("accounts");
    let mut checking = Entry::new("Checking")
        .with_username("jdoe")
        .with_password("p@ss w0rd ünïcode")
        .with_url("https://bank.example")
        .with_notes("PIN in the safe");
    checking.icon = 7;
    checking
        .documents
        .push(Document::new("statement.pdf", "pdf", vec![0x25, 0x50, 0x44, 0x46]));
    bank.entries.push(checking);
    bank.entries.push(Entry::new("Savings"));

    let mut archive = Folder::new("Archive");
    let mut old = Folder::new("2019");
    old.documents
        .push(Document::new("taxes.txt", "txt", b"filed".to_vec()));
    archive.folders.push(old);
    bank.folders.push(archive);

    let mut photos = Folder::new("Photos");
    photos.images.push(Media::new("passport.jpg", vec![0xFF, 0xD8, 0xFF], 90));
    photos.images.push(Media::new("empty.png", Vec::new(), 0));
    photos.videos.push(Media::new("walkthrough.mp4", vec![0, 0, 0, 0x18], 100));

    db.folders.push(bank);
    db.folders.push(photos);
    db.folders.push(Folder::new("Empty"));
    db
}

// ---------------------------------------------------------------------------
// Round-trip and rejection
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_preserves_every_field() {
    for encryption in Encryption::ALL {
        let db = rich_vault(encryption);
        let sealed = engine().encrypt(&db, "hunter22").unwrap();
        let opened = engine().decrypt(&sealed, "hunter22").unwrap();
        assert_eq!(opened, db);
    }
}

#[test]
fn empty_vault_roundtrips() {
    let db = Database::new("", "", Header::generate(Encryption::ChaCha20Poly1305, StorageType::Sqlite));
    let sealed = engine().encrypt(&db, "").unwrap();
    assert_eq!(engine().decrypt(&sealed, "").unwrap(), db);
}

#[test]
fn wrong_password_never_returns_a_tree() {
    let sealed = engine().encrypt(&rich_vault(Encryption::Aes256Gcm), "p1").unwrap();
    for guess in ["p2", "", "P1", "p1 "] {
        assert!(matches!(
            engine().decrypt(&sealed, guess),
            Err(VaultError::WrongPassword)
        ));
    }
}

#[test]
fn vault_opens_under_different_kdf_settings() {
    let sealed = engine().encrypt(&mail_vault(StorageType::File), "pw").unwrap();
    let other = Engine::with_kdf_params(Argon2Params {
        memory_kib: 2 * MIN_MEMORY_KIB,
        iterations: 2,
        parallelism: 1,
    });

    let opened = other.decrypt(&sealed, "pw").unwrap();
    assert_eq!(opened.name, "Vault");
    assert!(other.verify_password(&sealed, "pw").is_ok());

    // Re-sealing with the other engine records the other settings.
    let resealed = other.encrypt(&opened, "pw").unwrap();
    assert_eq!(&resealed.kdf, other.kdf_params());
    assert_eq!(engine().decrypt(&resealed, "pw").unwrap(), opened);
}

#[test]
fn every_parseable_header_can_seal_and_open() {
    let header = Header::parse("encryption: chacha20poly1305; storagetype: file; salt: abcdefgh")
        .unwrap();
    let db = Database::new("Short salt", "", header);
    let sealed = engine().encrypt(&db, "pw").unwrap();
    assert_eq!(engine().decrypt(&sealed, "pw").unwrap(), db);
}

#[test]
fn body_without_kdf_settings_uses_defaults() {
    let sealed = engine().encrypt(&mail_vault(StorageType::File), "pw").unwrap();
    let mut json: serde_json::Value = serde_json::from_slice(&sealed.to_json().unwrap()).unwrap();
    json.as_object_mut().unwrap().remove("kdf");

    let legacy = EncryptedDatabase::from_json(&serde_json::to_vec(&json).unwrap()).unwrap();
    assert_eq!(legacy.kdf, Argon2Params::default());
    assert_eq!(legacy.check, sealed.check);
}

// ---------------------------------------------------------------------------
// Shape and identity
// ---------------------------------------------------------------------------

#[test]
fn tree_shape_survives_encryption() {
    let db = rich_vault(Encryption::ChaCha20Poly1305);
    let sealed = engine().encrypt(&db, "pw").unwrap();

    // The sealed tree has the same topology before it is even opened.
    for kind in [
        ContentKind::Folder,
        ContentKind::Entry,
        ContentKind::Document,
        ContentKind::Image,
        ContentKind::Video,
    ] {
        assert_eq!(sealed.vault.count(kind), db.count(kind), "{kind}");
    }
    assert_eq!(sealed.vault.depth(), db.depth());
    assert_eq!(db.depth(), 3);
    assert_eq!(db.count(ContentKind::Folder), 5);
    assert_eq!(db.count(ContentKind::Document), 2);

    let opened = engine().decrypt(&sealed, "pw").unwrap();
    let names: Vec<_> = opened.contents().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["Bank", "Photos", "Empty"]);
}

#[test]
fn ids_are_stable_and_in_the_clear() {
    let db = rich_vault(Encryption::Aes256Gcm);
    let sealed = engine().encrypt(&db, "pw").unwrap();

    let mut plain_ids = Vec::new();
    db.fold((), &mut |(), item: &TocItem| plain_ids.push(item.id));
    let mut sealed_ids = Vec::new();
    sealed
        .vault
        .fold((), &mut |(), item: &TocItem<Sealed>| sealed_ids.push(item.id));

    assert_eq!(sealed.id(), db.id);
    assert_eq!(plain_ids, sealed_ids);

    let opened = engine().decrypt(&sealed, "pw").unwrap();
    let mut opened_ids = Vec::new();
    opened.fold((), &mut |(), item: &TocItem| opened_ids.push(item.id));
    assert_eq!(plain_ids, opened_ids);
}

#[test]
fn fields_are_sealed_independently_with_fresh_nonces() {
    let mut db = mail_vault(StorageType::File);
    db.folders[0].entries[0].username = "same".into();
    db.folders[0].entries[0].password = "same".into();

    let sealed = engine().encrypt(&db, "pw").unwrap();
    let entry = &sealed.vault.folders[0].entries[0];
    assert_ne!(entry.username, entry.password);

    let again = engine().encrypt(&db, "pw").unwrap();
    assert_ne!(again.vault.folders[0].entries[0].username, entry.username);
    assert_ne!(again.check, sealed.check);
}

#[test]
fn header_stays_readable() {
    let db = rich_vault(Encryption::ChaCha20Poly1305);
    let sealed = engine().encrypt(&db, "pw").unwrap();
    assert_eq!(sealed.header(), &db.header);

    let json = String::from_utf8(sealed.to_json().unwrap()).unwrap();
    assert!(json.contains("encryption: chacha20poly1305; storagetype: file; salt: "));
    assert!(!json.contains("Checking"));
    assert!(!json.contains("jdoe"));
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn flipped_field_byte_is_corrupt_not_wrong_password() {
    let db = mail_vault(StorageType::File);
    let mut sealed = engine().encrypt(&db, "Secret123!").unwrap();

    let title = sealed.vault.folders[0].entries[0].title.as_mut_bytes();
    let last = title.len() - 1;
    title[last] ^= 0x01;

    assert!(matches!(
        engine().decrypt(&sealed, "Secret123!"),
        Err(VaultError::Corrupt(_))
    ));
}

#[test]
fn truncated_time_field_is_corrupt() {
    let db = mail_vault(StorageType::File);
    let mut sealed = engine().encrypt(&db, "pw").unwrap();
    sealed.vault.folders[0].created.as_mut_bytes().truncate(4);

    assert!(matches!(
        engine().decrypt(&sealed, "pw"),
        Err(VaultError::Corrupt(_))
    ));
}

#[test]
fn garbage_json_is_corrupt() {
    assert!(matches!(
        EncryptedDatabase::from_json(b"{\"vault\": 12}"),
        Err(VaultError::Corrupt(_))
    ));
}

// ---------------------------------------------------------------------------
// End-to-end through a file-backed cache
// ---------------------------------------------------------------------------

#[test]
fn mail_scenario_through_file_cache() {
    let dir = TempDir::new().unwrap();
    let db = mail_vault(StorageType::File);
    let id = db.id;

    let mut cache = FileCache::open(dir.path()).unwrap();
    let sealed = engine().encrypt(&db, "Secret123!").unwrap();
    cache.put(&id, &sealed).unwrap();

    // Reload through a fresh handle.
    let cache = FileCache::open(dir.path()).unwrap();
    let loaded = cache.get(&id).unwrap();

    let opened = engine().decrypt(&loaded, "Secret123!").unwrap();
    assert_eq!(opened.folders[0].entries[0].title, "Mail");
    assert_eq!(opened.folders[0].entries[0].username, "a@b.com");
    assert_eq!(opened.folders[0].entries[0].password, "x");

    assert!(matches!(
        engine().decrypt(&loaded, "wrong"),
        Err(VaultError::WrongPassword)
    ));

    let mut damaged = loaded;
    damaged.vault.folders[0].entries[0].title.as_mut_bytes()[0] ^= 0x80;
    assert!(matches!(
        engine().decrypt(&damaged, "Secret123!"),
        Err(VaultError::Corrupt(_))
    ));
}

#[test]
fn change_password_then_reopen() {
    let db = rich_vault(Encryption::Aes256Gcm);
    let sealed = engine().encrypt(&db, "before").unwrap();

    let rotated = engine().change_password(&sealed, "before", "after").unwrap();
    assert_ne!(rotated.header().salt, db.header.salt);

    let opened = engine().decrypt(&rotated, "after").unwrap();
    assert_eq!(opened.folders, db.folders);
    assert_eq!(opened.name, db.name);

    assert!(matches!(
        engine().change_password(&sealed, "nope", "after"),
        Err(VaultError::WrongPassword)
    ));
}
