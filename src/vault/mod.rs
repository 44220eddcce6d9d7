//! Vault module: the encrypted tree and its transformation.
//!
//! This module provides:
//! - The header micro-format (`header`)
//! - The generic plaintext/sealed entity schema (`model`)
//! - Canonical field encodings and field codecs (`codec`)
//! - The encryption and decryption engines (`engine`)

pub mod codec;
pub mod engine;
pub mod header;
pub mod model;

// Re-export the most commonly used items.
pub use engine::{decrypt, encrypt, Engine, CHECK_STRING};
pub use header::{Encryption, Header, StorageType};
pub use model::{
    Ciphertext, ContentKind, Database, Document, EncryptedDatabase, Entry, Folder, Image, Media,
    Plain, Representation, Sealed, TocItem, Video,
};
