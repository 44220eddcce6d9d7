//! Cryptographic primitives for Strongroom.
//!
//! This module provides:
//! - AES-256-GCM and ChaCha20-Poly1305 field ciphers (`cipher`)
//! - Argon2id password-based key derivation (`kdf`)
//! - The zeroizing derived-key holder (`keys`)
//! - Salt and password generation (`generator`)

pub mod cipher;
pub mod generator;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{cipher_for, derive_key, generate_salt, ...};
pub use cipher::{cipher_for, FieldCipher};
pub use generator::{entropy_bits, generate_password, generate_salt, CharacterClasses};
pub use kdf::{derive_key, Argon2Params};
pub use keys::VaultKey;
