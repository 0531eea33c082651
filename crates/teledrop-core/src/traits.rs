//! Core traits for teledrop abstractions.
//!
//! These traits define the interfaces concrete implementations must satisfy,
//! enabling pluggable backends (the Metadata Store, the Blob Store) and
//! testability in isolation from Postgres and the filesystem.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Drop, ListParams};

/// The Metadata Store's transactional contract (§4.2).
///
/// A single implementation backs all five operations that mutate or read
/// drop/file rows; the coordinator never issues raw SQL itself.
#[async_trait]
pub trait DropRepository: Send + Sync {
    /// Insert a new drop and its file row in one transaction.
    ///
    /// `slug` must already have passed the lexical and reserved-word checks
    /// (§3, §4.4); this call enforces only the storage-level unique
    /// constraint and returns [`crate::error::Error::SlugTaken`] on conflict
    /// so the caller can retry with a fresh candidate.
    async fn create(&self, drop: Drop) -> Result<Drop>;

    /// Fetch a drop (with its file eagerly loaded) by slug.
    ///
    /// Returns [`crate::error::Error::NotFound`] if no row matches; the
    /// Access Evaluator is responsible for turning an absent row and an
    /// access-denied row into the same caller-visible outcome (§4.3).
    async fn find_by_slug(&self, slug: &str) -> Result<Drop>;

    /// Fetch a drop by its primary key.
    async fn find_by_id(&self, id: Uuid) -> Result<Drop>;

    /// List drops owned by `owner_id`, sorted and paginated per `params`.
    async fn list(&self, owner_id: &str, params: &ListParams) -> Result<Vec<Drop>>;

    /// Apply a partial update to a drop's mutable fields.
    ///
    /// Implementations must update `updated_at` unless the only field
    /// changed is `favorite`, which is excluded from that bump (§9).
    async fn update(&self, drop: Drop) -> Result<Drop>;

    /// Delete a drop and its file row in one transaction.
    ///
    /// Returns the deleted [`Drop`] so the caller can derive the Blob Store
    /// key to reclaim without a second read.
    async fn delete(&self, id: Uuid) -> Result<Drop>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::File;
    use chrono::Utc;
    use std::sync::Mutex;

    struct InMemoryRepository {
        drops: Mutex<Vec<Drop>>,
    }

    fn sample_drop(slug: &str, owner_id: &str) -> Drop {
        Drop {
            id: Uuid::now_v7(),
            slug: slug.to_string(),
            title: None,
            description: None,
            passphrase_hash: None,
            private: false,
            favorite: false,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            file: File {
                id: Uuid::now_v7(),
                drop_id: Uuid::now_v7(),
                name: "f.bin".to_string(),
                media_type: "application/octet-stream".to_string(),
                size: 0,
                content_hash: "0".repeat(64),
                storage_key: "00/00/0000".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    #[async_trait]
    impl DropRepository for InMemoryRepository {
        async fn create(&self, drop: Drop) -> Result<Drop> {
            let mut drops = self.drops.lock().unwrap();
            if drops.iter().any(|d| d.slug == drop.slug) {
                return Err(crate::error::Error::SlugTaken(drop.slug));
            }
            drops.push(drop.clone());
            Ok(drop)
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Drop> {
            self.drops
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.slug == slug)
                .cloned()
                .ok_or_else(|| crate::error::Error::NotFound(slug.to_string()))
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Drop> {
            self.drops
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .cloned()
                .ok_or_else(|| crate::error::Error::NotFound(id.to_string()))
        }

        async fn list(&self, owner_id: &str, _params: &ListParams) -> Result<Vec<Drop>> {
            Ok(self
                .drops
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn update(&self, drop: Drop) -> Result<Drop> {
            let mut drops = self.drops.lock().unwrap();
            let slot = drops
                .iter_mut()
                .find(|d| d.id == drop.id)
                .ok_or_else(|| crate::error::Error::NotFound(drop.id.to_string()))?;
            *slot = drop.clone();
            Ok(drop)
        }

        async fn delete(&self, id: Uuid) -> Result<Drop> {
            let mut drops = self.drops.lock().unwrap();
            let idx = drops
                .iter()
                .position(|d| d.id == id)
                .ok_or_else(|| crate::error::Error::NotFound(id.to_string()))?;
            Ok(drops.remove(idx))
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_slug() {
        let repo = InMemoryRepository {
            drops: Mutex::new(Vec::new()),
        };
        repo.create(sample_drop("taken", "owner")).await.unwrap();
        let err = repo
            .create(sample_drop("taken", "owner"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::SlugTaken(_)));
    }

    #[tokio::test]
    async fn find_by_slug_misses_cleanly() {
        let repo = InMemoryRepository {
            drops: Mutex::new(Vec::new()),
        };
        let err = repo.find_by_slug("missing").await.unwrap_err();
        assert!(matches!(err, crate::error::Error::NotFound(_)));
    }

    #[tokio::test]
    async fn list_scopes_to_owner() {
        let repo = InMemoryRepository {
            drops: Mutex::new(Vec::new()),
        };
        repo.create(sample_drop("mine", "alice")).await.unwrap();
        repo.create(sample_drop("theirs", "bob")).await.unwrap();
        let params = ListParams {
            sort: Default::default(),
            order: Default::default(),
            limit: None,
            offset: None,
        };
        let alice_drops = repo.list("alice", &params).await.unwrap();
        assert_eq!(alice_drops.len(), 1);
        assert_eq!(alice_drops[0].slug, "mine");
    }

    #[tokio::test]
    async fn delete_returns_deleted_row() {
        let repo = InMemoryRepository {
            drops: Mutex::new(Vec::new()),
        };
        let created = repo.create(sample_drop("gone", "owner")).await.unwrap();
        let deleted = repo.delete(created.id).await.unwrap();
        assert_eq!(deleted.slug, "gone");
        assert!(repo.find_by_id(created.id).await.is_err());
    }
}
