//! Error types for passphrase hashing and verification.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Passphrase too short.
    #[error("passphrase too short (minimum {0} characters required)")]
    PassphraseTooShort(usize),

    /// Passphrase too long.
    #[error("passphrase too long (maximum {0} characters allowed)")]
    PassphraseTooLong(usize),

    /// Hashing failed (Argon2 parameter or allocation error).
    #[error("passphrase hashing failed: {0}")]
    Hash(String),

    /// Stored verifier could not be parsed as a PHC string.
    #[error("stored passphrase verifier is malformed")]
    InvalidVerifier,
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
