//! Fundra API Server
//!
//! Main entry point for the Fundra reconciliation backend.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fundra_api::{AppState, create_router};
use fundra_core::storage::{StatementArchive, StorageConfig, StorageProvider};
use fundra_db::connect_with_pool;
use fundra_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundra=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    // Statement file archive
    let archive = build_archive(&config)?;
    if let Some(archive) = &archive {
        info!(provider = archive.provider_name(), "statement archive configured");
    }

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        archive: archive.map(Arc::new),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the statement archive from configuration.
fn build_archive(config: &AppConfig) -> anyhow::Result<Option<StatementArchive>> {
    let ingestion = &config.ingestion;

    let provider = match ingestion.storage_backend.as_str() {
        "fs" => StorageProvider::local_fs(ingestion.storage_root.clone()),
        "s3" => {
            let (Some(bucket), Some(region), Some(endpoint)) = (
                ingestion.storage_bucket.clone(),
                ingestion.storage_region.clone(),
                ingestion.storage_endpoint.clone(),
            ) else {
                anyhow::bail!("s3 storage backend requires bucket, region, and endpoint");
            };
            // Credentials come from the standard AWS environment variables.
            StorageProvider::s3(
                endpoint,
                bucket,
                std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default(),
                std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
                region,
            )
        }
        "none" => return Ok(None),
        other => anyhow::bail!("unknown storage backend: {other}"),
    };

    let storage_config =
        StorageConfig::new(provider).with_max_file_bytes(ingestion.max_file_bytes as u64);
    let archive = StatementArchive::from_config(storage_config)?;
    Ok(Some(archive))
}
