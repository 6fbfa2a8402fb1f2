//! Random identifier and short code generation.
//!
//! All randomness comes from the operating system CSPRNG via `getrandom`.
//! Failures of the entropy source are returned to the caller; there is no
//! fallback to a weaker generator.

use uuid::{Builder, Uuid};

/// Alphabet used for public short codes.
pub const SHORT_CODE_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Errors raised while drawing random identifiers.
#[derive(Debug, thiserror::Error)]
pub enum EntropyError {
    #[error("system random source failed: {0}")]
    Source(String),

    #[error("alphabet must be non-empty, ASCII only and free of repeated characters")]
    InvalidAlphabet,
}

impl From<getrandom::Error> for EntropyError {
    fn from(e: getrandom::Error) -> Self {
        EntropyError::Source(e.to_string())
    }
}

/// Generates a random version 4 UUID (122 random bits).
///
/// Used for user IDs, short link IDs and verification tokens.
pub fn new_id() -> Result<Uuid, EntropyError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)?;

    Ok(Builder::from_random_bytes(bytes).into_uuid())
}

/// Fills `len` bytes from the system random source.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, EntropyError> {
    let mut buffer = vec![0u8; len];
    getrandom::fill(&mut buffer)?;
    Ok(buffer)
}

/// Generates a string of `length` characters drawn uniformly from `alphabet`.
///
/// Uses rejection sampling so every character of the alphabet is equally
/// likely regardless of the alphabet size.
///
/// # Errors
///
/// Returns [`EntropyError::InvalidAlphabet`] if the alphabet is empty, not
/// ASCII or repeats a character, and [`EntropyError::Source`] if the system
/// random source fails.
///
/// # Examples
///
/// ```ignore
/// let code = new_short_code(SHORT_CODE_ALPHABET, 8)?;
/// assert_eq!(code.len(), 8);
/// ```
pub fn new_short_code(alphabet: &str, length: usize) -> Result<String, EntropyError> {
    let symbols = alphabet.as_bytes();

    if symbols.is_empty() || !alphabet.is_ascii() {
        return Err(EntropyError::InvalidAlphabet);
    }

    // A repeated symbol would be drawn more often than the others.
    let mut seen = [false; 128];
    for &symbol in symbols {
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(EntropyError::InvalidAlphabet);
        }
    }

    // Largest multiple of the alphabet size that fits in a byte; bytes at or
    // above it are discarded to keep the distribution uniform.
    let limit = 256 - (256 % symbols.len());

    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 64];

    while code.len() < length {
        getrandom::fill(&mut buffer)?;

        for &byte in buffer.iter() {
            if (byte as usize) < limit {
                code.push(symbols[byte as usize % symbols.len()] as char);
                if code.len() == length {
                    break;
                }
            }
        }
    }

    Ok(code)
}
