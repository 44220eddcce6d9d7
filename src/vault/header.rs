//! The vault header micro-format.
//!
//! A header is stored in the clear next to the ciphertext and names the
//! cipher, the storage backend and the KDF salt:
//!
//! ```text
//! encryption: aes256gcm; storagetype: file; salt: 3fQ9...
//! ```
//!
//! Tokens are separated by `;`, keys from values by `:`.  Whitespace
//! around tokens, keys and values is ignored on parse and normalized on
//! serialize.  All three keys are required, in any order, exactly once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::kdf::MIN_SALT_LEN;
use crate::errors::{Result, VaultError};

const KEY_ENCRYPTION: &str = "encryption";
const KEY_STORAGE: &str = "storagetype";
const KEY_SALT: &str = "salt";

/// Symmetric algorithm protecting a vault.
///
/// Tags are persisted in headers and must never be reused for a
/// different algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encryption {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl Encryption {
    pub const ALL: [Encryption; 2] = [Encryption::Aes256Gcm, Encryption::ChaCha20Poly1305];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Aes256Gcm => "aes256gcm",
            Self::ChaCha20Poly1305 => "chacha20poly1305",
        }
    }
}

/// Backend that owns a vault's persisted form.
///
/// Advisory metadata for routing; the crypto engines ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// Embedded structured-record store.
    Sqlite,
    /// Flat encrypted file.
    File,
    /// Platform secret store.
    Keychain,
}

impl StorageType {
    pub const ALL: [StorageType; 3] = [StorageType::Sqlite, StorageType::File, StorageType::Keychain];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
            Self::Keychain => "keychain",
        }
    }
}

macro_rules! tagged_enum_impls {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }

        impl FromStr for $ty {
            type Err = VaultError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $ty::ALL
                    .into_iter()
                    .find(|v| v.tag() == wanted)
                    .ok_or_else(|| {
                        VaultError::HeaderMalformed(format!("unknown {} '{wanted}'", $what))
                    })
            }
        }
    };
}

tagged_enum_impls!(Encryption, "encryption");
tagged_enum_impls!(StorageType, "storage type");

/// Unencrypted metadata identifying how to open a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub encryption: Encryption,
    pub storage: StorageType,
    pub salt: String,
}

impl Header {
    /// Build a header, rejecting salts that cannot survive the string format.
    pub fn new(encryption: Encryption, storage: StorageType, salt: impl Into<String>) -> Result<Self> {
        let salt = salt.into();
        validate_salt(&salt)?;
        Ok(Self {
            encryption,
            storage,
            salt,
        })
    }

    /// Build a header with a freshly generated salt.
    pub fn generate(encryption: Encryption, storage: StorageType) -> Self {
        Self {
            encryption,
            storage,
            salt: crate::crypto::generate_salt(),
        }
    }

    /// Parse the `encryption: ..; storagetype: ..; salt: ..` string.
    pub fn parse(raw: &str) -> Result<Self> {
        let tokens: Vec<&str> = raw.split(';').collect();
        if tokens.len() != 3 {
            return Err(VaultError::HeaderMalformed(format!(
                "expected 3 tokens, found {}",
                tokens.len()
            )));
        }

        let mut encryption = None;
        let mut storage = None;
        let mut salt = None;

        for token in tokens {
            let (key, value) = token.split_once(':').ok_or_else(|| {
                VaultError::HeaderMalformed(format!("token '{}' has no ':'", token.trim()))
            })?;
            let value = value.trim();

            let slot_taken = match key.trim() {
                KEY_ENCRYPTION => encryption.replace(value.parse::<Encryption>()?).is_some(),
                KEY_STORAGE => storage.replace(value.parse::<StorageType>()?).is_some(),
                KEY_SALT => salt.replace(value.to_string()).is_some(),
                other => {
                    return Err(VaultError::HeaderMalformed(format!("unknown key '{other}'")));
                }
            };
            if slot_taken {
                return Err(VaultError::HeaderMalformed(format!(
                    "duplicate key '{}'",
                    key.trim()
                )));
            }
        }

        // Three tokens, no duplicates, all known: every slot is filled.
        match (encryption, storage, salt) {
            (Some(encryption), Some(storage), Some(salt)) => Self::new(encryption, storage, salt),
            _ => Err(VaultError::HeaderMalformed("missing header key".into())),
        }
    }
}

fn validate_salt(salt: &str) -> Result<()> {
    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::HeaderMalformed(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if salt
        .chars()
        .any(|c| c == ';' || c == ':' || c.is_whitespace())
    {
        return Err(VaultError::HeaderMalformed(
            "salt contains a delimiter or whitespace".into(),
        ));
    }
    Ok(())
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{KEY_ENCRYPTION}: {}; {KEY_STORAGE}: {}; {KEY_SALT}: {}",
            self.encryption, self.storage, self.salt
        )
    }
}

impl FromStr for Header {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Persisted forms carry the header as its string, never as a JSON object.
impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Header::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_uses_canonical_layout() {
        let header = Header::new(Encryption::Aes256Gcm, StorageType::File, "abc12345").unwrap();
        assert_eq!(
            header.to_string(),
            "encryption: aes256gcm; storagetype: file; salt: abc12345"
        );
    }

    #[test]
    fn parse_is_order_independent_and_whitespace_tolerant() {
        let header =
            Header::parse("  salt:xyz98765 ;storagetype :keychain;   encryption:  chacha20poly1305 ")
                .unwrap();
        assert_eq!(header.encryption, Encryption::ChaCha20Poly1305);
        assert_eq!(header.storage, StorageType::Keychain);
        assert_eq!(header.salt, "xyz98765");
    }

    #[test]
    fn duplicate_key_is_malformed() {
        let err = Header::parse("salt: a; salt: b; encryption: aes256gcm").unwrap_err();
        assert!(matches!(err, VaultError::HeaderMalformed(_)));
    }

    #[test]
    fn generated_header_roundtrips() {
        let header = Header::generate(Encryption::ChaCha20Poly1305, StorageType::Sqlite);
        assert_eq!(Header::parse(&header.to_string()).unwrap(), header);
    }

    #[test]
    fn new_rejects_delimiters_in_salt() {
        assert!(Header::new(Encryption::Aes256Gcm, StorageType::File, "abcd;efgh").is_err());
        assert!(Header::new(Encryption::Aes256Gcm, StorageType::File, "abcd efgh").is_err());
        assert!(Header::new(Encryption::Aes256Gcm, StorageType::File, "").is_err());
        assert!(matches!(
            Header::new(Encryption::Aes256Gcm, StorageType::File, "abcdefg"),
            Err(VaultError::HeaderMalformed(_))
        ));
        assert!(Header::new(Encryption::Aes256Gcm, StorageType::File, "abcdefgh").is_ok());
    }

    #[test]
    fn serde_uses_header_string() {
        let header = Header::new(Encryption::Aes256Gcm, StorageType::Sqlite, "s4lt5alt").unwrap();
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(json, "\"encryption: aes256gcm; storagetype: sqlite; salt: s4lt5alt\"");
        let back: Header = serde_json::from_str(&json).unwrap();
        assert_eq!(back, header);
    }
}
