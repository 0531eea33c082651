//! Environment-driven configuration (§10.2).
//!
//! Loaded once at startup with the same `std::env::var(...).unwrap_or_else(...)`
//! idiom used throughout this codebase — no separate config-parsing crate.

use teledrop_crypto::Argon2Config;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,

    pub storage_backend: String,
    pub storage_root: String,
    pub s3_bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_region: Option<String>,

    pub max_upload_bytes: u64,
    pub chunk_size_bytes: usize,
    pub slug_length: usize,
    pub slug_alphabet: String,
    pub reserved_slugs: Vec<String>,
    pub operation_deadline_secs: u64,

    pub argon2: Argon2Config,

    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub operator_password_hash: Option<String>,

    pub cors_allowed_origins: Vec<String>,

    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
    pub rate_limit_enabled: bool,

    pub log_format: String,
    pub log_dir: Option<String>,
}

fn env_var(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the process environment. Call after
    /// `dotenvy::dotenv().ok()` so a `.env` file is visible here too.
    pub fn from_env() -> Self {
        let reserved_slugs = std::env::var("TELEDROP_RESERVED_SLUGS")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| {
                teledrop_core::defaults::RESERVED_SLUGS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let cors_allowed_origins = std::env::var("TELEDROP_CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let argon2 = Argon2Config {
            memory_kib: env_parse("TELEDROP_ARGON2_MEMORY_KIB", Argon2Config::default().memory_kib),
            iterations: env_parse("TELEDROP_ARGON2_ITERATIONS", Argon2Config::default().iterations),
            parallelism: env_parse("TELEDROP_ARGON2_PARALLELISM", Argon2Config::default().parallelism),
        };

        Self {
            bind_addr: env_var("TELEDROP_BIND_ADDR", teledrop_core::defaults::BIND_ADDR),
            database_url: env_var("DATABASE_URL", "postgres://localhost/teledrop"),
            database_max_connections: env_parse(
                "DATABASE_MAX_CONNECTIONS",
                teledrop_core::defaults::DB_MAX_CONNECTIONS,
            ),
            database_min_connections: env_parse(
                "DATABASE_MIN_CONNECTIONS",
                teledrop_core::defaults::DB_MIN_CONNECTIONS,
            ),

            storage_backend: env_var("TELEDROP_STORAGE_BACKEND", "filesystem"),
            storage_root: env_var("TELEDROP_STORAGE_ROOT", "./data/blobs"),
            s3_bucket: std::env::var("TELEDROP_S3_BUCKET").ok(),
            s3_endpoint: std::env::var("TELEDROP_S3_ENDPOINT").ok(),
            s3_region: std::env::var("TELEDROP_S3_REGION").ok(),

            max_upload_bytes: env_parse("TELEDROP_MAX_UPLOAD_BYTES", teledrop_core::defaults::MAX_UPLOAD_BYTES),
            chunk_size_bytes: env_parse("TELEDROP_CHUNK_SIZE_BYTES", teledrop_core::defaults::CHUNK_SIZE_BYTES),
            slug_length: env_parse("TELEDROP_SLUG_LENGTH", teledrop_core::defaults::AUTO_SLUG_LENGTH),
            slug_alphabet: env_var("TELEDROP_SLUG_ALPHABET", teledrop_core::defaults::AUTO_SLUG_ALPHABET),
            reserved_slugs,
            operation_deadline_secs: env_parse(
                "TELEDROP_OPERATION_DEADLINE_SECS",
                teledrop_core::defaults::OPERATION_DEADLINE_SECS,
            ),

            argon2,

            jwt_secret: env_var("TELEDROP_JWT_SECRET", "dev-insecure-secret-change-me"),
            jwt_ttl_secs: env_parse("TELEDROP_JWT_TTL_SECS", teledrop_core::defaults::JWT_TTL_SECS),
            operator_password_hash: std::env::var("TELEDROP_OPERATOR_PASSWORD_HASH").ok(),

            cors_allowed_origins,

            rate_limit_requests: env_parse("RATE_LIMIT_REQUESTS", teledrop_core::defaults::RATE_LIMIT_REQUESTS),
            rate_limit_period_secs: env_parse(
                "RATE_LIMIT_PERIOD_SECS",
                teledrop_core::defaults::RATE_LIMIT_PERIOD_SECS,
            ),
            rate_limit_enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),

            log_format: env_var("TELEDROP_LOG_FORMAT", "text"),
            log_dir: std::env::var("TELEDROP_LOG_DIR").ok(),
        }
    }
}
