//! Shared application state (§2, §10.4).

use std::sync::Arc;

use governor::{Quota, RateLimiter};
use governor::state::{InMemoryState, NotKeyed};
use governor::clock::DefaultClock;
use teledrop_core::DropRepository;
use teledrop_crypto::Argon2Config;
use teledrop_storage::StorageBackend;

use crate::config::Config;

/// Unkeyed, process-wide token bucket — every caller shares one budget, the
/// same coarse-grained policy the teacher applies ahead of its own handlers.
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct AppState {
    pub drops: Arc<dyn DropRepository>,
    pub storage: Arc<dyn StorageBackend>,
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,

    pub max_upload_bytes: u64,
    pub slug_length: usize,
    pub slug_alphabet: String,
    pub reserved_slugs: Vec<String>,
    pub operation_deadline_secs: u64,
    pub argon2: Argon2Config,

    pub jwt_secret: Arc<str>,
    pub jwt_ttl_secs: u64,
    pub operator_password_hash: Option<Arc<str>>,
}

impl AppState {
    pub fn new(drops: Arc<dyn DropRepository>, storage: Arc<dyn StorageBackend>, config: &Config) -> Self {
        let rate_limiter = if config.rate_limit_enabled {
            let quota = Quota::with_period(std::time::Duration::from_secs(
                config.rate_limit_period_secs.max(1),
            ))
            .expect("rate limit period must be nonzero")
            .allow_burst(std::num::NonZeroU32::new(config.rate_limit_requests.max(1)).unwrap());
            Some(Arc::new(RateLimiter::direct(quota)))
        } else {
            None
        };

        Self {
            drops,
            storage,
            rate_limiter,
            max_upload_bytes: config.max_upload_bytes,
            slug_length: config.slug_length,
            slug_alphabet: config.slug_alphabet.clone(),
            reserved_slugs: config.reserved_slugs.clone(),
            operation_deadline_secs: config.operation_deadline_secs,
            argon2: config.argon2,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            jwt_ttl_secs: config.jwt_ttl_secs,
            operator_password_hash: config.operator_password_hash.as_deref().map(Arc::from),
        }
    }
}
