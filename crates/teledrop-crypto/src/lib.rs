//! Passphrase hashing and verification for teledrop.
//!
//! Drops may be protected by a clear-text passphrase supplied by the owner at
//! creation or rotation time. Only an Argon2id verifier (a PHC string) is ever
//! persisted; the clear passphrase never reaches storage.

pub mod error;

pub use error::{CryptoError, CryptoResult};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Minimum accepted passphrase length, in bytes.
pub const MIN_PASSPHRASE_LENGTH: usize = 1;

/// Maximum accepted passphrase length, in bytes.
pub const MAX_PASSPHRASE_LENGTH: usize = 1024;

/// Tunable Argon2id parameters, sourced from the config surface.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        let defaults = Params::DEFAULT;
        Self {
            memory_kib: defaults.m_cost(),
            iterations: defaults.t_cost(),
            parallelism: defaults.p_cost(),
        }
    }
}

impl Argon2Config {
    fn build(self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Validates passphrase length against §4.4's precondition before any hashing work.
pub fn validate_passphrase_length(passphrase: &str) -> CryptoResult<()> {
    let len = passphrase.len();
    if len < MIN_PASSPHRASE_LENGTH {
        return Err(CryptoError::PassphraseTooShort(MIN_PASSPHRASE_LENGTH));
    }
    if len > MAX_PASSPHRASE_LENGTH {
        return Err(CryptoError::PassphraseTooLong(MAX_PASSPHRASE_LENGTH));
    }
    Ok(())
}

/// Hash a clear passphrase into a storable Argon2id PHC verifier string.
pub fn hash_passphrase(passphrase: &str, config: Argon2Config) -> CryptoResult<String> {
    validate_passphrase_length(passphrase)?;
    let argon2 = config.build()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| CryptoError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a clear passphrase against a stored PHC verifier.
///
/// A malformed verifier is treated as a verification failure, not a crash —
/// the access evaluator (§4.3) relies on this never returning an error.
pub fn verify_passphrase(passphrase: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(passphrase.as_bytes(), &parsed)
        .is_ok()
}
