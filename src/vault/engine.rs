//! Encryption and decryption of whole vault trees.
//!
//! Both directions are pure, synchronous tree walks.  The derived key
//! and password live only for the duration of one call.  A call either
//! returns a complete tree or an error; partial trees are never handed
//! back.

use zeroize::Zeroizing;

use super::codec::{Opener, Sealer};
use super::header::Header;
use super::model::{Ciphertext, ContentKind, Database, EncryptedDatabase};
use crate::crypto::cipher::constant_time_eq;
use crate::crypto::{cipher_for, derive_key, generate_salt, Argon2Params, FieldCipher, VaultKey};
use crate::errors::{Result, VaultError};

/// Known plaintext sealed into every vault to verify passwords.
pub const CHECK_STRING: &str = "strongroom-check-v1";

/// Seals new vaults with a fixed set of KDF parameters.
///
/// Opening always uses the parameters recorded in the sealed vault, so
/// the engine's own parameters only matter for `encrypt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    kdf: Argon2Params,
}

impl Engine {
    /// An engine using the default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that seals new vaults with explicit Argon2id parameters.
    pub fn with_kdf_params(kdf: Argon2Params) -> Self {
        Self { kdf }
    }

    pub fn kdf_params(&self) -> &Argon2Params {
        &self.kdf
    }

    /// Encrypt every field of `database` under a key derived from `password`.
    pub fn encrypt(&self, database: &Database, password: &str) -> Result<EncryptedDatabase> {
        let (cipher, key) =
            unlock(&database.header, &self.kdf, password).map_err(|e| match e {
                VaultError::KeyDerivationFailed(msg) => VaultError::EncryptionFailed(msg),
                other => other,
            })?;

        let check = Ciphertext::new(cipher.seal(&key, CHECK_STRING.as_bytes())?);

        let sealer = Sealer::new(cipher, &key);
        let vault = database.transform(&sealer).map_err(|e| match e {
            VaultError::EncryptionFailed(_) => e,
            other => VaultError::EncryptionFailed(other.to_string()),
        })?;

        tracing::debug!(
            vault = %database.id,
            encryption = %database.header.encryption,
            fields = sealer.fields(),
            folders = database.count(ContentKind::Folder),
            "sealed vault"
        );

        Ok(EncryptedDatabase {
            vault,
            check,
            kdf: self.kdf,
        })
    }

    /// Check `password` against the sealed check string only.
    ///
    /// Returns `WrongPassword` on mismatch, whatever the cipher mode.
    pub fn verify_password(&self, encrypted: &EncryptedDatabase, password: &str) -> Result<()> {
        let (cipher, key) = open_key(encrypted, password)?;
        verify_check(cipher, &key, &encrypted.check)
    }

    /// Decrypt `encrypted` back into a plaintext tree.
    ///
    /// The check string is verified before any tree content is touched.
    pub fn decrypt(&self, encrypted: &EncryptedDatabase, password: &str) -> Result<Database> {
        let (cipher, key) = open_key(encrypted, password)?;
        verify_check(cipher, &key, &encrypted.check)?;

        let opener = Opener::new(cipher, &key);
        let database = encrypted.vault.transform(&opener)?;

        tracing::debug!(
            vault = %database.id,
            fields = opener.fields(),
            "opened vault"
        );

        Ok(database)
    }

    /// Re-seal a vault under a new password and a fresh salt.
    ///
    /// The vault keeps the KDF parameters it was sealed with.
    pub fn change_password(
        &self,
        encrypted: &EncryptedDatabase,
        old_password: &str,
        new_password: &str,
    ) -> Result<EncryptedDatabase> {
        let database = self.decrypt(encrypted, old_password)?;
        Self::reseal(database, encrypted.kdf, new_password)
    }

    /// Seal an opened vault under `new_password` and a fresh salt.
    ///
    /// `kdf` should be the parameters the vault was sealed with.
    pub fn reseal(
        mut database: Database,
        kdf: Argon2Params,
        new_password: &str,
    ) -> Result<EncryptedDatabase> {
        database.header.salt = generate_salt();
        Engine::with_kdf_params(kdf).encrypt(&database, new_password)
    }
}

fn unlock(
    header: &Header,
    kdf: &Argon2Params,
    password: &str,
) -> Result<(&'static dyn FieldCipher, VaultKey)> {
    let cipher = cipher_for(header.encryption)?;
    let key = derive_key(password.as_bytes(), header.salt.as_bytes(), kdf)?;
    Ok((cipher, key))
}

/// Derive the key a sealed vault was locked with.
///
/// Stored parameters that Argon2 refuses can only come from a damaged body.
fn open_key(
    encrypted: &EncryptedDatabase,
    password: &str,
) -> Result<(&'static dyn FieldCipher, VaultKey)> {
    unlock(encrypted.header(), &encrypted.kdf, password).map_err(|e| match e {
        VaultError::KeyDerivationFailed(msg) => {
            VaultError::Corrupt(format!("stored KDF settings: {msg}"))
        }
        other => other,
    })
}

fn verify_check(cipher: &dyn FieldCipher, key: &VaultKey, check: &Ciphertext) -> Result<()> {
    let opened: Zeroizing<Vec<u8>> = cipher
        .open(key, check.as_bytes())
        .map_err(|_| VaultError::WrongPassword)?;

    if constant_time_eq(&opened, CHECK_STRING.as_bytes()) {
        Ok(())
    } else {
        Err(VaultError::WrongPassword)
    }
}

/// Encrypt with the default engine.
pub fn encrypt(database: &Database, password: &str) -> Result<EncryptedDatabase> {
    Engine::new().encrypt(database, password)
}

/// Decrypt with the default engine.
pub fn decrypt(encrypted: &EncryptedDatabase, password: &str) -> Result<Database> {
    Engine::new().decrypt(encrypted, password)
}
