use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, VaultError};
use crate::vault::{Encryption, StorageType};

/// Project-level configuration, loaded from `.strongroom.toml`.
///
/// Every field has a sensible default so Strongroom works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) where file and sqlite vaults live.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Cipher tag used for new vaults (e.g. "aes256gcm").
    #[serde(default = "default_encryption")]
    pub default_encryption: String,

    /// Storage tag used for new vaults (e.g. "file").
    #[serde(default = "default_storage")]
    pub default_storage: String,

    /// Length of generated passwords.
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".strongroom".to_string()
}

fn default_encryption() -> String {
    Encryption::Aes256Gcm.tag().to_string()
}

fn default_storage() -> String {
    StorageType::File.tag().to_string()
}

fn default_password_length() -> usize {
    20
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            default_encryption: default_encryption(),
            default_storage: default_storage(),
            password_length: default_password_length(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".strongroom.toml";

    /// Load settings from `<project_dir>/.strongroom.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or names an unknown
    /// cipher or backend, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!("no {} found, using defaults", Self::FILE_NAME);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.encryption()?;
        settings.storage()?;
        settings
            .argon2_params()
            .validate()
            .map_err(|e| VaultError::ConfigError(e.to_string()))?;

        Ok(settings)
    }

    /// The vault directory under `project_dir`.
    ///
    /// Example: `project_dir/.strongroom`
    pub fn vault_dir_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    pub fn encryption(&self) -> Result<Encryption> {
        self.default_encryption
            .parse()
            .map_err(|e: VaultError| VaultError::ConfigError(e.to_string()))
    }

    pub fn storage(&self) -> Result<StorageType> {
        self.default_storage
            .parse()
            .map_err(|e: VaultError| VaultError::ConfigError(e.to_string()))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, ".strongroom");
        assert_eq!(s.encryption().unwrap(), Encryption::Aes256Gcm);
        assert_eq!(s.storage().unwrap(), StorageType::File);
        assert_eq!(s.password_length, 20);
        assert_eq!(s.argon2_params(), Argon2Params::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, ".strongroom");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "secrets"
default_encryption = "chacha20poly1305"
default_storage = "sqlite"
password_length = 32
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".strongroom.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "secrets");
        assert_eq!(settings.encryption().unwrap(), Encryption::ChaCha20Poly1305);
        assert_eq!(settings.storage().unwrap(), StorageType::Sqlite);
        assert_eq!(settings.password_length, 32);
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".strongroom.toml"), "password_length = 12\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.password_length, 12);
        assert_eq!(settings.vault_dir, ".strongroom");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".strongroom.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_cipher_tag() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".strongroom.toml"),
            "default_encryption = \"rot13\"\n",
        )
        .unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn load_rejects_weak_argon2_memory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".strongroom.toml"),
            "argon2_memory_kib = 1024\n",
        )
        .unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn vault_dir_path_respects_custom_dir() {
        let s = Settings {
            vault_dir: "secrets".to_string(),
            ..Settings::default()
        };
        let project = Path::new("/home/user/myproject");
        assert_eq!(
            s.vault_dir_path(project),
            PathBuf::from("/home/user/myproject/secrets")
        );
    }
}
