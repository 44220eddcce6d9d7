//! The vault tree: databases, folders, entries, documents and media.
//!
//! There is one schema, generic over a [`Representation`].  `Plain`
//! fills every field with its native value; `Sealed` fills every field
//! with an opaque [`Ciphertext`].  Ids, headers and tree shape are the
//! same in both, so `Database<Plain>` and `Database<Sealed>` always have
//! identical topology and ids act as the join key between the two.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::codec::{base64_decode, base64_encode, FieldCodec};
use super::header::Header;
use crate::crypto::Argon2Params;
use crate::errors::{Result, VaultError};

/// Bounds every field type must satisfy.
pub trait FieldValue: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {}

impl<T> FieldValue for T where T: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {}

/// Maps each kind of field to its concrete type.
pub trait Representation: Clone + fmt::Debug + PartialEq + 'static {
    type Text: FieldValue;
    type Bytes: FieldValue;
    type Time: FieldValue;
    type Number: FieldValue;
}

/// Native in-memory values.  Only ever exists between unlock and lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plain;

impl Representation for Plain {
    type Text = String;
    type Bytes = Vec<u8>;
    type Time = DateTime<Utc>;
    type Number = u32;
}

/// Every field replaced by its sealed form.  The only persisted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sealed;

impl Representation for Sealed {
    type Text = Ciphertext;
    type Bytes = Ciphertext;
    type Time = Ciphertext;
    type Number = Ciphertext;
}

/// An opaque sealed field: `nonce || ciphertext || tag`.
///
/// Serialized as a base64 string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")] Vec<u8>,
);

impl Ciphertext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Mutable access to the raw bytes (repair tooling and tests).
    pub fn as_mut_bytes(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// What a table-of-contents item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Folder,
    Entry,
    Document,
    Image,
    Video,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Folder => "folder",
            Self::Entry => "entry",
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
        };
        f.write_str(name)
    }
}

/// Index record for one child of a folder.
///
/// The kind and id are in the clear; the name follows the representation,
/// so a sealed folder can be enumerated without decrypting anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TocItem<R: Representation = Plain> {
    pub id: Uuid,
    pub kind: ContentKind,
    pub name: R::Text,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Root of a vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Database<R: Representation = Plain> {
    pub id: Uuid,
    pub name: R::Text,
    pub description: R::Text,
    pub header: Header,
    pub folders: Vec<Folder<R>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Folder<R: Representation = Plain> {
    pub id: Uuid,
    pub name: R::Text,
    pub description: R::Text,
    pub icon: R::Number,
    pub created: R::Time,
    pub edited: R::Time,
    pub folders: Vec<Folder<R>>,
    pub entries: Vec<Entry<R>>,
    pub documents: Vec<Document<R>>,
    pub images: Vec<Image<R>>,
    pub videos: Vec<Video<R>>,
}

/// A credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Entry<R: Representation = Plain> {
    pub id: Uuid,
    pub title: R::Text,
    pub username: R::Text,
    pub password: R::Text,
    pub url: R::Text,
    pub notes: R::Text,
    pub icon: R::Number,
    pub created: R::Time,
    pub edited: R::Time,
    pub documents: Vec<Document<R>>,
}

/// A binary attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Document<R: Representation = Plain> {
    pub id: Uuid,
    pub name: R::Text,
    pub file_type: R::Text,
    pub data: R::Bytes,
    pub created: R::Time,
    pub edited: R::Time,
}

/// An image or video payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Media<R: Representation = Plain> {
    pub id: Uuid,
    pub name: R::Text,
    pub data: R::Bytes,
    /// Compression quality, 0..=100.
    pub quality: R::Number,
    pub created: R::Time,
    pub edited: R::Time,
}

pub type Image<R = Plain> = Media<R>;
pub type Video<R = Plain> = Media<R>;

/// A sealed vault plus the sealed check string that proves a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedDatabase {
    pub vault: Database<Sealed>,
    pub check: Ciphertext,
    /// Argon2id settings the vault was sealed with.
    #[serde(default)]
    pub kdf: Argon2Params,
}

impl EncryptedDatabase {
    pub fn id(&self) -> Uuid {
        self.vault.id
    }

    pub fn header(&self) -> &Header {
        &self.vault.header
    }

    /// Keyed JSON encoding; only ids and the header are in the clear.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| VaultError::SerializationError(format!("vault {}: {e}", self.id())))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| VaultError::Corrupt(format!("vault body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Transformation
// ---------------------------------------------------------------------------
//
// One walk per entity, shared by encryption and decryption.  Struct
// literal fields are evaluated top to bottom, which fixes the visiting
// order: own scalars, nested folders, entries, documents, images, videos.

fn transform_all<T, U>(items: &[T], f: impl FnMut(&T) -> Result<U>) -> Result<Vec<U>> {
    items.iter().map(f).collect()
}

impl<R: Representation> Database<R> {
    pub fn transform<T, C>(&self, codec: &C) -> Result<Database<T>>
    where
        T: Representation,
        C: FieldCodec<R, T>,
    {
        Ok(Database {
            id: self.id,
            name: codec.text(&self.name)?,
            description: codec.text(&self.description)?,
            header: self.header.clone(),
            folders: transform_all(&self.folders, |f| f.transform(codec))?,
        })
    }
}

impl<R: Representation> Folder<R> {
    pub fn transform<T, C>(&self, codec: &C) -> Result<Folder<T>>
    where
        T: Representation,
        C: FieldCodec<R, T>,
    {
        Ok(Folder {
            id: self.id,
            name: codec.text(&self.name)?,
            description: codec.text(&self.description)?,
            icon: codec.number(&self.icon)?,
            created: codec.time(&self.created)?,
            edited: codec.time(&self.edited)?,
            folders: transform_all(&self.folders, |f| f.transform(codec))?,
            entries: transform_all(&self.entries, |e| e.transform(codec))?,
            documents: transform_all(&self.documents, |d| d.transform(codec))?,
            images: transform_all(&self.images, |m| m.transform(codec))?,
            videos: transform_all(&self.videos, |m| m.transform(codec))?,
        })
    }
}

impl<R: Representation> Entry<R> {
    pub fn transform<T, C>(&self, codec: &C) -> Result<Entry<T>>
    where
        T: Representation,
        C: FieldCodec<R, T>,
    {
        Ok(Entry {
            id: self.id,
            title: codec.text(&self.title)?,
            username: codec.text(&self.username)?,
            password: codec.text(&self.password)?,
            url: codec.text(&self.url)?,
            notes: codec.text(&self.notes)?,
            icon: codec.number(&self.icon)?,
            created: codec.time(&self.created)?,
            edited: codec.time(&self.edited)?,
            documents: transform_all(&self.documents, |d| d.transform(codec))?,
        })
    }
}

impl<R: Representation> Document<R> {
    pub fn transform<T, C>(&self, codec: &C) -> Result<Document<T>>
    where
        T: Representation,
        C: FieldCodec<R, T>,
    {
        Ok(Document {
            id: self.id,
            name: codec.text(&self.name)?,
            file_type: codec.text(&self.file_type)?,
            data: codec.bytes(&self.data)?,
            created: codec.time(&self.created)?,
            edited: codec.time(&self.edited)?,
        })
    }
}

impl<R: Representation> Media<R> {
    pub fn transform<T, C>(&self, codec: &C) -> Result<Media<T>>
    where
        T: Representation,
        C: FieldCodec<R, T>,
    {
        Ok(Media {
            id: self.id,
            name: codec.text(&self.name)?,
            data: codec.bytes(&self.data)?,
            quality: codec.number(&self.quality)?,
            created: codec.time(&self.created)?,
            edited: codec.time(&self.edited)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Table of contents
// ---------------------------------------------------------------------------

impl<R: Representation> Folder<R> {
    pub fn toc_item(&self) -> TocItem<R> {
        TocItem {
            id: self.id,
            kind: ContentKind::Folder,
            name: self.name.clone(),
        }
    }

    /// Immediate children in folder, entry, document, image, video order.
    pub fn contents(&self) -> Vec<TocItem<R>> {
        let mut items = Vec::with_capacity(
            self.folders.len()
                + self.entries.len()
                + self.documents.len()
                + self.images.len()
                + self.videos.len(),
        );
        items.extend(self.folders.iter().map(|f| f.toc_item()));
        items.extend(self.entries.iter().map(|e| e.toc_item()));
        items.extend(self.documents.iter().map(|d| d.toc_item()));
        items.extend(self.images.iter().map(|m| m.toc_item(ContentKind::Image)));
        items.extend(self.videos.iter().map(|m| m.toc_item(ContentKind::Video)));
        items
    }

    /// Fold over every descendant's index record, pre-order.
    ///
    /// Nested folders are descended into, and an entry is followed by
    /// its attached documents.
    pub fn fold<A>(&self, init: A, f: &mut impl FnMut(A, &TocItem<R>) -> A) -> A {
        let mut acc = init;
        for folder in &self.folders {
            acc = f(acc, &folder.toc_item());
            acc = folder.fold(acc, f);
        }
        for entry in &self.entries {
            acc = f(acc, &entry.toc_item());
            for document in &entry.documents {
                acc = f(acc, &document.toc_item());
            }
        }
        for document in &self.documents {
            acc = f(acc, &document.toc_item());
        }
        for image in &self.images {
            acc = f(acc, &image.toc_item(ContentKind::Image));
        }
        for video in &self.videos {
            acc = f(acc, &video.toc_item(ContentKind::Video));
        }
        acc
    }

    /// Number of descendants of `kind`, not counting this folder.
    pub fn count(&self, kind: ContentKind) -> usize {
        self.fold(0, &mut |n: usize, item: &TocItem<R>| {
            n + usize::from(item.kind == kind)
        })
    }

    /// Nesting depth; a folder without subfolders has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.folders.iter().map(|f| f.depth()).max().unwrap_or(0)
    }
}

impl<R: Representation> Entry<R> {
    pub fn toc_item(&self) -> TocItem<R> {
        TocItem {
            id: self.id,
            kind: ContentKind::Entry,
            name: self.title.clone(),
        }
    }
}

impl<R: Representation> Document<R> {
    pub fn toc_item(&self) -> TocItem<R> {
        TocItem {
            id: self.id,
            kind: ContentKind::Document,
            name: self.name.clone(),
        }
    }
}

impl<R: Representation> Media<R> {
    pub fn toc_item(&self, kind: ContentKind) -> TocItem<R> {
        TocItem {
            id: self.id,
            kind,
            name: self.name.clone(),
        }
    }
}

impl<R: Representation> Database<R> {
    /// Top-level folders as index records.
    pub fn contents(&self) -> Vec<TocItem<R>> {
        self.folders.iter().map(|f| f.toc_item()).collect()
    }

    pub fn fold<A>(&self, init: A, f: &mut impl FnMut(A, &TocItem<R>) -> A) -> A {
        let mut acc = init;
        for folder in &self.folders {
            acc = f(acc, &folder.toc_item());
            acc = folder.fold(acc, f);
        }
        acc
    }

    /// Number of items of `kind` anywhere in the vault.
    pub fn count(&self, kind: ContentKind) -> usize {
        self.fold(0, &mut |n: usize, item: &TocItem<R>| {
            n + usize::from(item.kind == kind)
        })
    }

    /// Deepest folder nesting; 0 for a vault without folders.
    pub fn depth(&self) -> usize {
        self.folders.iter().map(|f| f.depth()).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Plaintext construction and lookup
// ---------------------------------------------------------------------------

impl Database<Plain> {
    pub fn new(name: impl Into<String>, description: impl Into<String>, header: Header) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            header,
            folders: Vec::new(),
        }
    }

    /// First folder named `name`, searching depth-first.
    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find_map(|f| f.find_by_name(name))
    }

    pub fn folder_by_name_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find_map(|f| f.find_by_name_mut(name))
    }

    pub fn find_folder_mut(&mut self, id: Uuid) -> Option<&mut Folder> {
        self.folders.iter_mut().find_map(|f| f.find_mut(id))
    }
}

impl Folder<Plain> {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            icon: 0,
            created: now,
            edited: now,
            folders: Vec::new(),
            entries: Vec::new(),
            documents: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn touch(&mut self) {
        self.edited = Utc::now();
    }

    pub fn entry_by_title(&self, title: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.title == title)
    }

    pub fn entry_by_title_mut(&mut self, title: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.title == title)
    }

    fn find_by_name(&self, name: &str) -> Option<&Folder> {
        if self.name == name {
            return Some(self);
        }
        self.folders.iter().find_map(|f| f.find_by_name(name))
    }

    fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Folder> {
        if self.name == name {
            return Some(self);
        }
        self.folders.iter_mut().find_map(|f| f.find_by_name_mut(name))
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Folder> {
        if self.id == id {
            return Some(self);
        }
        self.folders.iter_mut().find_map(|f| f.find_mut(id))
    }
}

impl Entry<Plain> {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            username: String::new(),
            password: String::new(),
            url: String::new(),
            notes: String::new(),
            icon: 0,
            created: now,
            edited: now,
            documents: Vec::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn touch(&mut self) {
        self.edited = Utc::now();
    }
}

impl Document<Plain> {
    pub fn new(name: impl Into<String>, file_type: impl Into<String>, data: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            file_type: file_type.into(),
            data,
            created: now,
            edited: now,
        }
    }
}

impl Media<Plain> {
    /// Highest compression quality.
    pub const MAX_QUALITY: u32 = 100;

    /// Quality is clamped to `0..=100`.
    pub fn new(name: impl Into<String>, data: Vec<u8>, quality: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data,
            quality: quality.min(Self::MAX_QUALITY),
            created: now,
            edited: now,
        }
    }
}
