//! Slug validation and candidate generation (§3, §4.4).
//!
//! Both functions are pure and non-suspending (§5): validation is a
//! character-class and length check, and candidate generation draws from an
//! in-process RNG. Neither touches the Metadata Store — uniqueness is the
//! store's job (§4.2's unique-slug insert primitive).

use rand::Rng;

use crate::defaults::{AUTO_SLUG_ALPHABET, AUTO_SLUG_LENGTH, RESERVED_SLUGS, SLUG_MAX_LENGTH, SLUG_MIN_LENGTH};
use crate::error::{Error, Result};

/// Validate a user-supplied slug against §3's lexical rules, using the
/// compile-time default reserved-segment list.
///
/// Checks length (4-64), character set (`[A-Za-z0-9_-]`), and the reserved
/// route segment list. Does not check uniqueness — that is enforced by the
/// Metadata Store's unique constraint under the Create transaction.
pub fn validate(slug: &str) -> Result<()> {
    validate_with_reserved(slug, RESERVED_SLUGS)
}

/// Same as [`validate`], but checking the reserved-segment list against a
/// caller-supplied set rather than the compile-time default — for
/// deployments that override `TELEDROP_RESERVED_SLUGS` (§10.2).
pub fn validate_with_reserved<S: AsRef<str>>(slug: &str, reserved: &[S]) -> Result<()> {
    if slug.len() < SLUG_MIN_LENGTH || slug.len() > SLUG_MAX_LENGTH {
        return Err(Error::SlugInvalid(format!(
            "slug must be between {SLUG_MIN_LENGTH} and {SLUG_MAX_LENGTH} characters"
        )));
    }
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(Error::SlugInvalid(
            "slug may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    let lower = slug.to_lowercase();
    if reserved.iter().any(|r| r.as_ref().eq_ignore_ascii_case(&lower)) {
        return Err(Error::SlugInvalid(format!("'{slug}' is a reserved route segment")));
    }
    Ok(())
}

/// Draw one auto-generated slug candidate (§4.4 step 2), using the default
/// length and alphabet.
///
/// The caller retries on a `SlugConflict` from the Metadata Store, up to
/// [`crate::defaults::AUTO_SLUG_MAX_ATTEMPTS`] times, before giving up with
/// `SlugExhausted`.
pub fn generate_candidate() -> String {
    generate_candidate_with(AUTO_SLUG_LENGTH, AUTO_SLUG_ALPHABET)
}

/// Draw one candidate using a caller-supplied length and alphabet, for
/// deployments that override the config surface (§10.2's
/// `TELEDROP_SLUG_LENGTH`/`TELEDROP_SLUG_ALPHABET`).
pub fn generate_candidate_with(length: usize, alphabet: &str) -> String {
    let mut rng = rand::thread_rng();
    let alphabet = alphabet.as_bytes();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}
