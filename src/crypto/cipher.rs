//! Pluggable authenticated field ciphers.
//!
//! Every scalar field of a vault is sealed on its own.  Each call to
//! `seal` generates a fresh random 12-byte nonce and prepends it to the
//! ciphertext; `open` splits the nonce back out before decrypting.
//!
//! Layout of a sealed field:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! Which cipher applies is decided by the `encryption` tag of the vault
//! header.  Each implementation sits behind a cargo feature, so a build
//! can legitimately lack one and report the vault as unsupported.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::keys::VaultKey;
use crate::errors::{Result, VaultError};
use crate::vault::header::Encryption;

/// Nonce length shared by AES-256-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length shared by both algorithms.
pub const TAG_LEN: usize = 16;

/// Symmetric AEAD used to seal individual vault fields.
pub trait FieldCipher: Send + Sync {
    /// The header tag this cipher implements.
    fn encryption(&self) -> Encryption;

    /// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
    fn seal(&self, key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt data produced by `seal`, verifying its tag.
    fn open(&self, key: &VaultKey, data: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

/// Resolve the cipher implementation for a header's encryption tag.
pub fn cipher_for(encryption: Encryption) -> Result<&'static dyn FieldCipher> {
    match encryption {
        #[cfg(feature = "aes-gcm-cipher")]
        Encryption::Aes256Gcm => Ok(&aes::Aes256GcmCipher),
        #[cfg(feature = "chacha-cipher")]
        Encryption::ChaCha20Poly1305 => Ok(&chacha::ChaCha20Poly1305Cipher),
        #[allow(unreachable_patterns)]
        other => Err(VaultError::UnknownEncryption(other.to_string())),
    }
}

/// Compare two byte strings without leaking where they differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}

fn split_nonce(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::Corrupt(format!(
            "sealed field is {} bytes, shorter than nonce and tag",
            data.len()
        )));
    }
    Ok(data.split_at(NONCE_LEN))
}

fn join_nonce(nonce: &[u8], ciphertext: Vec<u8>) -> Vec<u8> {
    let mut output = Vec::with_capacity(nonce.len() + ciphertext.len());
    output.extend_from_slice(nonce);
    output.extend_from_slice(&ciphertext);
    output
}

#[cfg(feature = "aes-gcm-cipher")]
mod aes {
    use aes_gcm::aead::{Aead, KeyInit, OsRng};
    use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
    use zeroize::Zeroizing;

    use super::{join_nonce, split_nonce, FieldCipher};
    use crate::crypto::keys::VaultKey;
    use crate::errors::{Result, VaultError};
    use crate::vault::header::Encryption;

    /// AES-256 in Galois/Counter Mode.
    pub struct Aes256GcmCipher;

    impl FieldCipher for Aes256GcmCipher {
        fn encryption(&self) -> Encryption {
            Encryption::Aes256Gcm
        }

        fn seal(&self, key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>> {
            let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

            let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

            let ciphertext = cipher
                .encrypt(&nonce, plaintext)
                .map_err(|e| VaultError::EncryptionFailed(format!("AES-256-GCM: {e}")))?;

            Ok(join_nonce(&nonce, ciphertext))
        }

        fn open(&self, key: &VaultKey, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
            let (nonce_bytes, ciphertext) = split_nonce(data)?;

            let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|e| VaultError::Corrupt(format!("invalid key length: {e}")))?;

            let plaintext = cipher
                .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
                .map_err(|_| VaultError::Corrupt("AES-256-GCM tag mismatch".into()))?;

            Ok(Zeroizing::new(plaintext))
        }
    }
}

#[cfg(feature = "chacha-cipher")]
mod chacha {
    use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
    use chacha20poly1305::{ChaCha20Poly1305, Nonce};
    use zeroize::Zeroizing;

    use super::{join_nonce, split_nonce, FieldCipher};
    use crate::crypto::keys::VaultKey;
    use crate::errors::{Result, VaultError};
    use crate::vault::header::Encryption;

    /// ChaCha20 stream cipher with a Poly1305 MAC.
    pub struct ChaCha20Poly1305Cipher;

    impl FieldCipher for ChaCha20Poly1305Cipher {
        fn encryption(&self) -> Encryption {
            Encryption::ChaCha20Poly1305
        }

        fn seal(&self, key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>> {
            let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
                .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

            let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

            let ciphertext = cipher
                .encrypt(&nonce, plaintext)
                .map_err(|e| VaultError::EncryptionFailed(format!("ChaCha20-Poly1305: {e}")))?;

            Ok(join_nonce(&nonce, ciphertext))
        }

        fn open(&self, key: &VaultKey, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
            let (nonce_bytes, ciphertext) = split_nonce(data)?;

            let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
                .map_err(|e| VaultError::Corrupt(format!("invalid key length: {e}")))?;

            let plaintext = cipher
                .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
                .map_err(|_| VaultError::Corrupt("ChaCha20-Poly1305 tag mismatch".into()))?;

            Ok(Zeroizing::new(plaintext))
        }
    }
}
