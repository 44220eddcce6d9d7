//! Flat-file backend: one `<id>.vault` file per vault.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [SRVT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header string][body JSON][SHA-256: 32 bytes]
//! ```
//!
//! - **Magic** (`SRVT`): identifies the file as a Strongroom vault.
//! - **Version**: file format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   string ends and the body JSON begins.
//! - **Header string**: the vault header, readable without parsing the
//!   body, so listing stays cheap.
//! - **Body JSON**: the serialized `EncryptedDatabase`.
//! - **SHA-256**: digest over header + body bytes.  The backend never
//!   holds a key, so this detects damage, not tampering; the AEAD tags
//!   inside the body cover the latter.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{ensure_id_matches, VaultCache, VaultSummary};
use crate::errors::{Result, VaultError};
use crate::vault::{EncryptedDatabase, Header};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"SRVT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the digest appended to the file (SHA-256 = 32 bytes).
const DIGEST_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Extension of vault files.
pub const EXTENSION: &str = "vault";

// ---------------------------------------------------------------------------
// FileCache
// ---------------------------------------------------------------------------

/// A directory of vault files.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` as the vault directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the vault with `id` lives.
    pub fn path_for(&self, id: &Uuid) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }
}

impl VaultCache for FileCache {
    fn list(&self) -> Result<Vec<VaultSummary>> {
        let mut list = Vec::new();

        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            else {
                continue;
            };

            // One unreadable file should not hide the rest; `get` reports it.
            match read_header(&path) {
                Ok(header) => list.push(VaultSummary { id, header }),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping vault file"),
            }
        }

        list.sort_by_key(|s| s.id);
        Ok(list)
    }

    fn get(&self, id: &Uuid) -> Result<EncryptedDatabase> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(VaultError::NotFound(*id));
        }

        let raw = read_vault(&path)?;
        if raw.vault.id() != *id {
            return Err(VaultError::Corrupt(format!(
                "file {} holds vault {}",
                path.display(),
                raw.vault.id()
            )));
        }
        if raw.header != *raw.vault.header() {
            return Err(VaultError::Corrupt(
                "file header disagrees with vault body".into(),
            ));
        }

        tracing::debug!(vault = %id, path = %path.display(), "read vault file");
        Ok(raw.vault)
    }

    fn put(&mut self, id: &Uuid, vault: &EncryptedDatabase) -> Result<()> {
        ensure_id_matches(id, vault)?;
        let path = self.path_for(id);
        write_vault(&path, vault)?;
        tracing::debug!(vault = %id, path = %path.display(), "wrote vault file");
        Ok(())
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(VaultError::NotFound(*id));
        }
        fs::remove_file(&path)
            .map_err(|e| VaultError::Storage(format!("delete {}: {e}", path.display())))
    }

    fn exists(&self, id: &Uuid) -> bool {
        self.path_for(id).is_file()
    }
}

// ---------------------------------------------------------------------------
// Binary format
// ---------------------------------------------------------------------------

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize the header string and the body JSON.
/// 2. Compute the digest over header + body bytes.
/// 3. Write to a temp file in the same directory.
/// 4. Rename temp file over the target path.
///
/// The rename ensures readers never see a half-written file.
pub fn write_vault(path: &Path, vault: &EncryptedDatabase) -> Result<()> {
    let header_bytes = vault.header().to_string().into_bytes();
    let body_bytes = vault.to_json()?;

    let digest = compute_digest(&header_bytes, &body_bytes);

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        VaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let total = PREFIX_LEN + header_bytes.len() + body_bytes.len() + DIGEST_LEN;
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header string
    buf.extend_from_slice(&body_bytes); // body JSON
    buf.extend_from_slice(&digest); // 32 bytes

    // The temp file is in the same directory so rename is atomic on the
    // same filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)
        .map_err(|e| VaultError::Storage(format!("write {}: {e}", tmp_path.display())))?;

    // Owner-only permissions before the file becomes visible.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(VaultError::Storage(format!(
            "rename into {}: {e}",
            path.display()
        )));
    }

    Ok(())
}

/// A vault file after its digest has been verified.
pub struct RawVault {
    pub header: Header,
    pub vault: EncryptedDatabase,
}

/// Read a vault file, verify its digest and decode both sections.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    let data = fs::read(path)?;

    // Minimum size: prefix + digest.
    if data.len() < PREFIX_LEN + DIGEST_LEN {
        return Err(VaultError::Corrupt(
            "file too small to be a valid vault".into(),
        ));
    }

    let header_len = parse_prefix(&data[..PREFIX_LEN])?;
    let header_end = PREFIX_LEN + header_len;
    if header_end + DIGEST_LEN > data.len() {
        return Err(VaultError::Corrupt("header length exceeds file size".into()));
    }

    let header_bytes = &data[PREFIX_LEN..header_end];
    let body_end = data.len() - DIGEST_LEN;
    let body_bytes = &data[header_end..body_end];
    let stored_digest = &data[body_end..];

    if compute_digest(header_bytes, body_bytes).as_slice() != stored_digest {
        return Err(VaultError::Corrupt(format!(
            "checksum mismatch in {}",
            path.display()
        )));
    }

    let header = parse_header(header_bytes)?;
    let vault = EncryptedDatabase::from_json(body_bytes)?;

    Ok(RawVault { header, vault })
}

/// Read only the prefix and header string of a vault file.
pub fn read_header(path: &Path) -> Result<Header> {
    let mut file = fs::File::open(path)?;

    let mut prefix = [0u8; PREFIX_LEN];
    file.read_exact(&mut prefix)
        .map_err(|_| VaultError::Corrupt("file too small to be a valid vault".into()))?;
    let header_len = parse_prefix(&prefix)?;

    // The length is unverified until the digest is checked; bound it by
    // the file size before allocating.
    let file_len = file.metadata()?.len();
    let needed = (PREFIX_LEN + DIGEST_LEN) as u64 + header_len as u64;
    if needed > file_len {
        return Err(VaultError::Corrupt("header length exceeds file size".into()));
    }

    let mut header_bytes = vec![0u8; header_len];
    file.read_exact(&mut header_bytes)
        .map_err(|_| VaultError::Corrupt("header length exceeds file size".into()))?;

    parse_header(&header_bytes)
}

fn parse_prefix(prefix: &[u8]) -> Result<usize> {
    if &prefix[0..4] != MAGIC {
        return Err(VaultError::Corrupt("missing SRVT magic bytes".into()));
    }

    let version = prefix[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::Storage(format!(
            "unsupported file version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        prefix[5..9]
            .try_into()
            .map_err(|_| VaultError::Corrupt("bad header length".into()))?,
    );
    usize::try_from(header_len_u32).map_err(|_| {
        VaultError::Corrupt(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    let raw = std::str::from_utf8(bytes)
        .map_err(|_| VaultError::HeaderMalformed("header is not valid UTF-8".into()))?;
    Header::parse(raw)
}

/// SHA-256 over header + body bytes.
fn compute_digest(header_bytes: &[u8], body_bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(header_bytes);
    hasher.update(body_bytes);
    hasher.finalize().into()
}
