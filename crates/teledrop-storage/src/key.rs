//! Storage key derivation (§4.1).
//!
//! A file's storage key is derived from its own ID, not its content, so a
//! rename (§4.4's replace-content operation) can publish a new blob under a
//! fresh key without touching any other file's path. The key is a two-level
//! hex fan-out computed from `sha256(file_id)`, which keeps any single
//! directory from accumulating more than a few hundred entries even with
//! millions of files.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derive the storage key for `file_id`.
///
/// Format: `{hh}/{hh}/{rest}` where `hh` are the first two hex bytes of
/// `sha256(file_id)` and `rest` is the remaining hex digest.
pub fn derive_storage_key(file_id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}/{}/{}", &digest[0..2], &digest[2..4], &digest[4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_two_level_fan_out() {
        let key = derive_storage_key(Uuid::now_v7());
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 60);
    }

    #[test]
    fn key_is_deterministic_for_same_id() {
        let id = Uuid::now_v7();
        assert_eq!(derive_storage_key(id), derive_storage_key(id));
    }

    #[test]
    fn distinct_ids_yield_distinct_keys() {
        assert_ne!(
            derive_storage_key(Uuid::now_v7()),
            derive_storage_key(Uuid::now_v7())
        );
    }
}
