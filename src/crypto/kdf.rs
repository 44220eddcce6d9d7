//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters for new vaults come from
//! `.strongroom.toml` (or sensible defaults).  Each sealed vault records
//! the parameters it was sealed with, so re-opening always derives the
//! same key.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings` so the CLI can pass
/// whatever the user configured in `.strongroom.toml`.  Vaults sealed
/// before the parameters were recorded fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2 refuses salts shorter than this.
pub const MIN_SALT_LEN: usize = 8;

impl Argon2Params {
    /// Reject dangerously weak KDF settings.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(VaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(VaultError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(VaultError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive the 32-byte vault key from a password and the header salt.
///
/// The same password + salt + params will always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<VaultKey> {
    argon2_params.validate()?;

    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::KeyDerivationFailed(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = VaultKey::zeroed();
    argon2
        .hash_password_into(password, salt, key.as_mut_bytes())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    tracing::debug!(
        memory_kib = argon2_params.memory_kib,
        iterations = argon2_params.iterations,
        "derived vault key"
    );

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let k1 = derive_key(b"password", b"saltsaltsalt", &fast()).unwrap();
        let k2 = derive_key(b"password", b"saltsaltsalt", &fast()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_salt_gives_different_key() {
        let k1 = derive_key(b"password", b"saltsaltsalt", &fast()).unwrap();
        let k2 = derive_key(b"password", b"peppersalted", &fast()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn weak_params_are_rejected() {
        let weak = Argon2Params {
            memory_kib: 1024,
            ..fast()
        };
        assert!(derive_key(b"pw", b"saltsaltsalt", &weak).is_err());
    }

    #[test]
    fn short_salt_is_rejected() {
        assert!(derive_key(b"pw", b"short", &fast()).is_err());
    }
}
