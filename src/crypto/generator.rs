//! Random salts and passwords.
//!
//! Passwords are drawn uniformly from the *union* of the selected
//! character classes: every position is an independent draw over the
//! merged alphabet, so a 20-character password over all four classes
//! carries exactly `20 * log2(94)` bits.

use rand::Rng;

use crate::errors::{Result, VaultError};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";

/// The 32 printable ASCII punctuation characters.
pub const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Salt length in characters.  24 alphanumerics carry ~142 bits.
pub const SALT_LEN: usize = 24;

/// Which character classes a generated password may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterClasses {
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl CharacterClasses {
    /// Every class enabled.
    pub const fn all() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }

    /// No class enabled; combine with struct update syntax.
    pub const fn none() -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.uppercase || self.lowercase || self.digits || self.symbols)
    }

    /// The merged alphabet, in a fixed order.
    pub fn alphabet(&self) -> Vec<char> {
        let mut chars = Vec::with_capacity(94);
        if self.uppercase {
            chars.extend(UPPERCASE.chars());
        }
        if self.lowercase {
            chars.extend(LOWERCASE.chars());
        }
        if self.digits {
            chars.extend(DIGITS.chars());
        }
        if self.symbols {
            chars.extend(SYMBOLS.chars());
        }
        chars
    }
}

impl Default for CharacterClasses {
    fn default() -> Self {
        Self::all()
    }
}

/// Generate a password of `length` characters from `classes`.
pub fn generate_password(length: usize, classes: CharacterClasses) -> Result<String> {
    if classes.is_empty() {
        return Err(VaultError::CommandFailed(
            "select at least one character class".into(),
        ));
    }
    Ok(draw(length, &classes.alphabet()))
}

/// Generate a random salt for a new vault header.
///
/// Alphanumeric only, so the salt never collides with the `;` and `:`
/// delimiters of the header string.
pub fn generate_salt() -> String {
    let classes = CharacterClasses {
        symbols: false,
        ..CharacterClasses::all()
    };
    draw(SALT_LEN, &classes.alphabet())
}

/// Entropy of a generated password in bits.
pub fn entropy_bits(length: usize, classes: CharacterClasses) -> f64 {
    let size = classes.alphabet().len();
    if size == 0 {
        return 0.0;
    }
    length as f64 * (size as f64).log2()
}

fn draw(length: usize, alphabet: &[char]) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}
