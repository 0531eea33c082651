//! Shared test harness: an in-memory `DropRepository` and a tempdir-backed
//! `FilesystemBackend`, wired through `teledrop_api::app` the same way
//! `main.rs` wires the real Postgres/filesystem implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use teledrop_core::{Drop, DropRepository, Error, ListParams, Result};
use uuid::Uuid;

pub struct InMemoryRepository {
    drops: Mutex<Vec<Drop>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self { drops: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl DropRepository for InMemoryRepository {
    async fn create(&self, drop: Drop) -> Result<Drop> {
        let mut drops = self.drops.lock().unwrap();
        if drops.iter().any(|d| d.slug == drop.slug) {
            return Err(Error::SlugTaken(drop.slug));
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
            .ok_or_else(|| Error::NotFound(slug.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Drop> {
        self.drops
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
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
            .ok_or_else(|| Error::NotFound(drop.id.to_string()))?;
        *slot = drop.clone();
        Ok(drop)
    }

    async fn delete(&self, id: Uuid) -> Result<Drop> {
        let mut drops = self.drops.lock().unwrap();
        let idx = drops
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(drops.remove(idx))
    }
}

/// Build a full router over an in-memory repository and a tempdir-backed
/// filesystem blob store. Returns the `TempDir` guard alongside the router
/// so callers keep the directory alive for the test's duration.
pub fn test_app() -> (Router, tempfile::TempDir) {
    test_app_with_max_upload(10 * 1024 * 1024)
}

/// Same as [`test_app`], but with a caller-supplied upload size cap — used
/// by the size-limit end-to-end scenario (§8's "size cap" property).
pub fn test_app_with_max_upload(max_upload_bytes: u64) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(teledrop_storage::FilesystemBackend::new(dir.path()));
    let repo: Arc<dyn DropRepository> = Arc::new(InMemoryRepository::new());

    let config = teledrop_api::config::Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: String::new(),
        database_max_connections: 1,
        database_min_connections: 1,
        storage_backend: "filesystem".to_string(),
        storage_root: dir.path().to_string_lossy().to_string(),
        s3_bucket: None,
        s3_endpoint: None,
        s3_region: None,
        max_upload_bytes,
        chunk_size_bytes: 64 * 1024,
        slug_length: teledrop_core::defaults::AUTO_SLUG_LENGTH,
        slug_alphabet: teledrop_core::defaults::AUTO_SLUG_ALPHABET.to_string(),
        reserved_slugs: teledrop_core::defaults::RESERVED_SLUGS.iter().map(|s| s.to_string()).collect(),
        operation_deadline_secs: teledrop_core::defaults::OPERATION_DEADLINE_SECS,
        argon2: teledrop_crypto::Argon2Config {
            memory_kib: 8 * 1024,
            iterations: 1,
            parallelism: 1,
        },
        jwt_secret: "test-secret".to_string(),
        jwt_ttl_secs: 3600,
        operator_password_hash: Some(teledrop_crypto::hash_passphrase("operator-pw", teledrop_crypto::Argon2Config {
            memory_kib: 8 * 1024,
            iterations: 1,
            parallelism: 1,
        }).unwrap()),
        cors_allowed_origins: Vec::new(),
        rate_limit_requests: 1000,
        rate_limit_period_secs: 60,
        rate_limit_enabled: false,
        log_format: "text".to_string(),
        log_dir: None,
    };

    let state = teledrop_api::state::AppState::new(repo, storage, &config);
    (teledrop_api::app(state, &config), dir)
}

/// Issue a bearer token for the fixed test operator password ("operator-pw").
pub fn owner_token() -> String {
    teledrop_api::auth::issue_token("test-secret", 3600).unwrap()
}
