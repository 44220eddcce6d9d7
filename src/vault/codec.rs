//! Field codecs: how one scalar changes representation.
//!
//! The tree walk in `model` is written once and parameterized by a
//! [`FieldCodec`].  [`Sealer`] turns `Plain` fields into `Sealed` ones;
//! [`Opener`] does the reverse.  Non-text values go through a canonical
//! fixed-width big-endian encoding before sealing, so any implementation
//! decodes them to the identical value:
//!
//! ```text
//! time   = i64 BE seconds since epoch || u32 BE nanoseconds   (12 bytes)
//! number = u32 BE                                             (4 bytes)
//! text   = UTF-8
//! ```

use std::cell::Cell;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::model::{Ciphertext, Plain, Representation, Sealed};
use crate::crypto::{FieldCipher, VaultKey};
use crate::errors::{Result, VaultError};

/// Converts each kind of field from representation `F` to `T`.
pub trait FieldCodec<F: Representation, T: Representation> {
    fn text(&self, value: &F::Text) -> Result<T::Text>;
    fn bytes(&self, value: &F::Bytes) -> Result<T::Bytes>;
    fn time(&self, value: &F::Time) -> Result<T::Time>;
    fn number(&self, value: &F::Number) -> Result<T::Number>;
}

// ---------------------------------------------------------------------------
// Canonical encodings
// ---------------------------------------------------------------------------

pub const TIME_LEN: usize = 12;
pub const NUMBER_LEN: usize = 4;

pub fn encode_time(value: &DateTime<Utc>) -> [u8; TIME_LEN] {
    let mut out = [0u8; TIME_LEN];
    out[..8].copy_from_slice(&value.timestamp().to_be_bytes());
    out[8..].copy_from_slice(&value.timestamp_subsec_nanos().to_be_bytes());
    out
}

pub fn decode_time(bytes: &[u8]) -> Result<DateTime<Utc>> {
    let raw: [u8; TIME_LEN] = bytes.try_into().map_err(|_| {
        VaultError::Corrupt(format!(
            "timestamp is {} bytes, expected {TIME_LEN}",
            bytes.len()
        ))
    })?;
    let mut secs = [0u8; 8];
    secs.copy_from_slice(&raw[..8]);
    let mut nanos = [0u8; 4];
    nanos.copy_from_slice(&raw[8..]);

    let secs = i64::from_be_bytes(secs);
    let nanos = u32::from_be_bytes(nanos);
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| VaultError::Corrupt(format!("timestamp {secs}.{nanos} out of range")))
}

pub fn encode_number(value: u32) -> [u8; NUMBER_LEN] {
    value.to_be_bytes()
}

pub fn decode_number(bytes: &[u8]) -> Result<u32> {
    let raw: [u8; NUMBER_LEN] = bytes.try_into().map_err(|_| {
        VaultError::Corrupt(format!(
            "number is {} bytes, expected {NUMBER_LEN}",
            bytes.len()
        ))
    })?;
    Ok(u32::from_be_bytes(raw))
}

// ---------------------------------------------------------------------------
// Sealing and opening
// ---------------------------------------------------------------------------

/// Encrypts each field independently under one key.
pub struct Sealer<'a> {
    cipher: &'a dyn FieldCipher,
    key: &'a VaultKey,
    fields: Cell<usize>,
}

impl<'a> Sealer<'a> {
    pub fn new(cipher: &'a dyn FieldCipher, key: &'a VaultKey) -> Self {
        Self {
            cipher,
            key,
            fields: Cell::new(0),
        }
    }

    /// How many fields have been sealed so far.
    pub fn fields(&self) -> usize {
        self.fields.get()
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        let sealed = self.cipher.seal(self.key, plaintext)?;
        self.fields.set(self.fields.get() + 1);
        Ok(Ciphertext::new(sealed))
    }
}

impl FieldCodec<Plain, Sealed> for Sealer<'_> {
    fn text(&self, value: &String) -> Result<Ciphertext> {
        self.seal(value.as_bytes())
    }

    fn bytes(&self, value: &Vec<u8>) -> Result<Ciphertext> {
        self.seal(value)
    }

    fn time(&self, value: &DateTime<Utc>) -> Result<Ciphertext> {
        self.seal(&encode_time(value))
    }

    fn number(&self, value: &u32) -> Result<Ciphertext> {
        self.seal(&encode_number(*value))
    }
}

/// Decrypts each field and parses it back into its canonical type.
///
/// Every failure is `Corrupt`: by the time an opener runs, the password
/// has already been verified against the check string.
pub struct Opener<'a> {
    cipher: &'a dyn FieldCipher,
    key: &'a VaultKey,
    fields: Cell<usize>,
}

impl<'a> Opener<'a> {
    pub fn new(cipher: &'a dyn FieldCipher, key: &'a VaultKey) -> Self {
        Self {
            cipher,
            key,
            fields: Cell::new(0),
        }
    }

    pub fn fields(&self) -> usize {
        self.fields.get()
    }

    fn open(&self, sealed: &Ciphertext) -> Result<zeroize::Zeroizing<Vec<u8>>> {
        let plaintext = self
            .cipher
            .open(self.key, sealed.as_bytes())
            .map_err(|e| match e {
                VaultError::Corrupt(msg) => {
                    VaultError::Corrupt(format!("field {}: {msg}", self.fields()))
                }
                other => VaultError::Corrupt(other.to_string()),
            })?;
        self.fields.set(self.fields.get() + 1);
        Ok(plaintext)
    }
}

impl FieldCodec<Sealed, Plain> for Opener<'_> {
    fn text(&self, value: &Ciphertext) -> Result<String> {
        let plaintext = self.open(value)?;
        String::from_utf8(plaintext.to_vec())
            .map_err(|_| VaultError::Corrupt("text field is not valid UTF-8".into()))
    }

    fn bytes(&self, value: &Ciphertext) -> Result<Vec<u8>> {
        Ok(self.open(value)?.to_vec())
    }

    fn time(&self, value: &Ciphertext) -> Result<DateTime<Utc>> {
        decode_time(&self.open(value)?)
    }

    fn number(&self, value: &Ciphertext) -> Result<u32> {
        decode_number(&self.open(value)?)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
