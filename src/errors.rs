use thiserror::Error;
use uuid::Uuid;

/// All errors that can occur in Strongroom.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Header errors ---
    #[error("Malformed vault header: {0}")]
    HeaderMalformed(String),

    #[error("Unsupported vault: encryption '{0}' is not available in this build")]
    UnknownEncryption(String),

    // --- Crypto errors ---
    #[error("Wrong password")]
    WrongPassword,

    #[error("Vault data is corrupt: {0}")]
    Corrupt(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Vault {0} not found")]
    NotFound(Uuid),

    #[error("Vault {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Guidance shown to the user next to the error message.
    ///
    /// A wrong password and a damaged vault need different remedies, so
    /// they never share a hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::WrongPassword => "Check the password and try again.",
            Self::Corrupt(_) => {
                "The vault is damaged. Restore it from a backup; retrying will not help."
            }
            Self::HeaderMalformed(_) | Self::UnknownEncryption(_) => {
                "This vault cannot be opened by this version of strongroom."
            }
            Self::EncryptionFailed(_) | Self::Storage(_) | Self::Io(_) | Self::KeyringError(_) => {
                "Saving or loading failed. This is usually transient; try again."
            }
            Self::NotFound(_) => "Run `strongroom list` to see the available vaults.",
            Self::ConfigError(_) | Self::KeyDerivationFailed(_) => {
                "Fix .strongroom.toml or remove it to use the defaults."
            }
            _ => "",
        }
    }

    /// Whether repeating the operation can succeed without restoring data.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::WrongPassword
                | Self::EncryptionFailed(_)
                | Self::Storage(_)
                | Self::Io(_)
                | Self::KeyringError(_)
        )
    }
}

/// Convenience type alias for Strongroom results.
pub type Result<T> = std::result::Result<T, VaultError>;
