//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::storage::{existing_caches, VaultCache};
use crate::vault::{Database, EncryptedDatabase, Engine, StorageType};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before any password prompt.
pub const PASSWORD_ENV: &str = "STRONGROOM_PASSWORD";

/// Strongroom CLI: client-side encrypted vaults of folders, entries and files.
#[derive(Parser)]
#[command(
    name = "strongroom",
    about = "Client-side encrypted vault for passwords, documents and media",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: vault_dir from .strongroom.toml)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Create {
        /// Vault name
        name: String,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Cipher: aes256gcm or chacha20poly1305
        #[arg(long)]
        encryption: Option<String>,
        /// Backend: file, sqlite or keychain
        #[arg(long)]
        storage: Option<String>,
    },

    /// List all vaults
    List,

    /// Decrypt a vault and print its contents
    Show {
        /// Vault id or unique id prefix
        vault: String,
    },

    /// Add a folder to a vault
    AddFolder {
        /// Vault id or unique id prefix
        vault: String,
        /// Folder name
        name: String,
        /// Nest under this folder instead of the vault root
        #[arg(long)]
        parent: Option<String>,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Add a password entry to a folder
    AddEntry {
        /// Vault id or unique id prefix
        vault: String,
        /// Folder name
        folder: String,
        /// Entry title
        title: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Entry password (prompted for when neither this nor --generate is given)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate the password instead of prompting (optional length)
        #[arg(short, long, value_name = "LEN", num_args = 0..=1)]
        generate: Option<Option<usize>>,
    },

    /// Import a file into a folder (or onto an entry) as a document, image or video
    Attach {
        /// Vault id or unique id prefix
        vault: String,
        /// Folder name
        folder: String,
        /// File to import
        file: PathBuf,
        /// What the file is
        #[arg(short, long, value_enum, default_value_t = AttachKind::Document)]
        kind: AttachKind,
        /// Attach to this entry (documents only)
        #[arg(short, long)]
        entry: Option<String>,
        /// Media quality 0-100 (images and videos)
        #[arg(short, long, default_value_t = 100)]
        quality: u32,
    },

    /// Print (or copy) an entry's password
    Get {
        /// Vault id or unique id prefix
        vault: String,
        /// Folder name
        folder: String,
        /// Entry title
        title: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// Delete a vault
    Delete {
        /// Vault id or unique id prefix
        vault: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change a vault's password (re-encrypts under a fresh salt)
    ChangePassword {
        /// Vault id or unique id prefix
        vault: String,
    },

    /// Generate a random password
    Generate {
        /// Password length (default: password_length from .strongroom.toml)
        #[arg(short, long)]
        length: Option<usize>,
        #[arg(long)]
        no_upper: bool,
        #[arg(long)]
        no_lower: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_symbols: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// What `attach` turns a file into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AttachKind {
    Document,
    Image,
    Video,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `STRONGROOM_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `create`).
///
/// Also respects `STRONGROOM_PASSWORD` for scripted/CI usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        check_password_len(&pw)?;
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if let Err(e) = check_password_len(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

fn check_password_len(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::CommandFailed(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Settings, vault directory and engine for one CLI invocation.
pub struct Workspace {
    pub settings: Settings,
    pub vault_dir: PathBuf,
    pub engine: Engine,
}

impl Workspace {
    /// Load `.strongroom.toml` from the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(&cwd)?;
        let vault_dir = match &cli.dir {
            Some(dir) => cwd.join(dir),
            None => settings.vault_dir_path(&cwd),
        };
        let engine = Engine::with_kdf_params(settings.argon2_params());
        Ok(Self {
            settings,
            vault_dir,
            engine,
        })
    }

    /// Find the single vault whose id starts with `query`.
    pub fn locate(&self, query: &str) -> Result<Located> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return Err(VaultError::CommandFailed("vault id cannot be empty".into()));
        }

        let mut matches = Vec::new();
        for (storage, cache) in existing_caches(&self.vault_dir) {
            let ids: Vec<Uuid> = cache
                .list()?
                .into_iter()
                .map(|s| s.id)
                .filter(|id| id.to_string().starts_with(&query))
                .collect();
            if !ids.is_empty() {
                matches.push((storage, cache, ids));
            }
        }

        let total: usize = matches.iter().map(|(_, _, ids)| ids.len()).sum();
        match total {
            0 => Err(VaultError::CommandFailed(format!(
                "no vault matches '{query}'"
            ))),
            1 => {
                let (storage, cache, ids) = matches.remove(0);
                Ok(Located {
                    id: ids[0],
                    storage,
                    cache,
                })
            }
            n => Err(VaultError::CommandFailed(format!(
                "'{query}' matches {n} vaults; use a longer prefix"
            ))),
        }
    }

    /// Locate a vault, ask for its password and decrypt it.
    pub fn unlock(&self, query: &str) -> Result<Unlocked> {
        let located = self.locate(query)?;
        let sealed = located.load()?;
        let password = prompt_password()?;
        let database = self.engine.decrypt(&sealed, &password)?;
        Ok(Unlocked {
            located,
            database,
            password,
        })
    }
}

/// A vault found in one of the backends.
pub struct Located {
    pub id: Uuid,
    pub storage: StorageType,
    pub cache: Box<dyn VaultCache>,
}

impl Located {
    pub fn load(&self) -> Result<EncryptedDatabase> {
        self.cache.get(&self.id)
    }
}

/// A decrypted vault, ready to edit and seal again.
pub struct Unlocked {
    pub located: Located,
    pub database: Database,
    password: Zeroizing<String>,
}

impl Unlocked {
    /// Re-encrypt under the same password and store it where it came from.
    pub fn save(&mut self, engine: &Engine) -> Result<()> {
        let sealed = engine.encrypt(&self.database, &self.password)?;
        self.located.cache.put(&self.located.id, &sealed)
    }

    /// The folder named `name`, searched depth-first.
    pub fn folder_mut(&mut self, name: &str) -> Result<&mut crate::vault::Folder> {
        self.database
            .folder_by_name_mut(name)
            .ok_or_else(|| VaultError::CommandFailed(format!("no folder named '{name}'")))
    }
}
