//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Statement ingestion configuration.
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Statement ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    /// Maximum accepted statement file size in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    /// Where raw statement files are archived ("fs" or "s3").
    #[serde(default = "default_storage_backend")]
    pub storage_backend: String,
    /// Root directory for the "fs" backend.
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    /// Bucket name for the "s3" backend.
    pub storage_bucket: Option<String>,
    /// Region for the "s3" backend.
    pub storage_region: Option<String>,
    /// Custom endpoint for S3-compatible stores.
    pub storage_endpoint: Option<String>,
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_storage_backend() -> String {
    "fs".to_string()
}

fn default_storage_root() -> String {
    "./data/statements".to_string()
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            storage_backend: default_storage_backend(),
            storage_root: default_storage_root(),
            storage_bucket: None,
            storage_region: None,
            storage_endpoint: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FUNDRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
