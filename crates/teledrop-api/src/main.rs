//! Process entry point: load configuration, connect the Metadata Store and
//! Blob Store, run the startup sweep, and serve the router built in `lib.rs`.

use std::net::SocketAddr;

use teledrop_api::config::Config;
use teledrop_api::state::AppState;
use teledrop_storage::StorageBackend;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    let _log_guard = teledrop_api::init_tracing(&config);

    info!(
        log_format = %config.log_format,
        log_dir = config.log_dir.as_deref().unwrap_or("(stdout)"),
        "logging initialized"
    );

    let pool_config = teledrop_db::PoolConfig {
        max_connections: config.database_max_connections,
        min_connections: config.database_min_connections,
        ..Default::default()
    };
    let db = teledrop_db::Database::connect_with_config(&config.database_url, pool_config).await?;
    db.migrate().await?;
    teledrop_db::log_pool_metrics(&db.pool);

    let storage: std::sync::Arc<dyn StorageBackend> = match config.storage_backend.as_str() {
        #[cfg(feature = "s3")]
        "s3" => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| anyhow::anyhow!("TELEDROP_S3_BUCKET is required for the s3 backend"))?;
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = &config.s3_region {
                loader = loader.region(aws_config::Region::new(region.clone()));
            }
            let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&loader.load().await);
            if let Some(endpoint) = &config.s3_endpoint {
                s3_config_builder = s3_config_builder.endpoint_url(endpoint).force_path_style(true);
            }
            let client = aws_sdk_s3::Client::from_conf(s3_config_builder.build());
            std::sync::Arc::new(teledrop_storage::S3Backend::new(client, bucket, "./data/s3-spool"))
        }
        _ => {
            let backend = teledrop_storage::FilesystemBackend::new(&config.storage_root)
                .with_chunk_size(config.chunk_size_bytes);
            if let Err(e) = backend.validate().await {
                anyhow::bail!("filesystem storage health check failed: {e}");
            }
            match backend.sweep_stale(teledrop_core::defaults::SWEEP_STALE_AGE_HOURS).await {
                Ok(swept) if swept > 0 => info!(
                    subsystem = "storage",
                    component = "filesystem_backend",
                    op = "sweep",
                    swept_count = swept,
                    "startup sweep reclaimed stale temp files"
                ),
                Ok(_) => {}
                Err(e) => tracing::warn!(subsystem = "storage", error = %e, "startup sweep failed"),
            }
            std::sync::Arc::new(backend)
        }
    };

    let state = AppState::new(db.drops.clone(), storage, &config);
    let app = teledrop_api::app(state, &config);

    let addr: SocketAddr = config.bind_addr.parse()?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
