//! # teledrop-db
//!
//! PostgreSQL-backed Metadata Store for teledrop (§4.2).
//!
//! ```rust,ignore
//! use teledrop_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/teledrop").await?;
//!     let drop = db.drops.find_by_slug("abc12345").await?;
//!     println!("{}", drop.slug);
//!     Ok(())
//! }
//! ```

pub mod drop_repository;
pub mod pool;

pub use drop_repository::PgDropRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

use std::sync::Arc;
use teledrop_core::{DropRepository, Result};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub drops: Arc<dyn DropRepository>,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        let drops = Arc::new(PgDropRepository::new(pool.clone()));
        Self { pool, drops }
    }

    /// Connect with the default [`PoolConfig`] and wrap the pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with a custom [`PoolConfig`].
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded migrations (§10.3). Gated behind the `migrations`
    /// feature so consumers that run migrations out-of-band (a deploy-time
    /// `sqlx migrate run`) do not pay for the embedded binary data.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| teledrop_core::Error::Storage(e.to_string()))
    }
}
