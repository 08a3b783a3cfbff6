//! Configuration management

use std::path::PathBuf;

use crate::db::DbConfig;
use crate::geonames::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};

/// Default dump location, as published under geonames.org/export/dump
pub const DEFAULT_SOURCE_PATH: &str = "geonames/cities5000.txt";

/// Ingestion configuration
#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    pub database: DbConfig,
    pub load: LoadConfig,
}

/// Load-specific settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Dump file to load
    pub source_path: PathBuf,

    /// Rows per INSERT statement
    pub batch_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadConfig {
    /// Environment variables:
    /// - CITYDB_SOURCE
    /// - CITYDB_BATCH_SIZE
    pub fn from_env() -> Self {
        Self {
            source_path: std::env::var("CITYDB_SOURCE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCE_PATH)),

            batch_size: std::env::var("CITYDB_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }
}

impl IngestConfig {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database: DbConfig::from_env(),
            load: LoadConfig::from_env(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.load.batch_size == 0 {
            anyhow::bail!("Batch size must be greater than 0");
        }

        if self.load.batch_size > MAX_BATCH_SIZE {
            anyhow::bail!(
                "Batch size too large ({} > {})",
                self.load.batch_size,
                MAX_BATCH_SIZE
            );
        }

        Ok(())
    }
}
