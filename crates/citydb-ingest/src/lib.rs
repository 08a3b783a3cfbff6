//! citydb ingest library
//!
//! Loads GeoNames city dumps into a SQLite `city` table. Every load is a
//! full refresh: the file is parsed completely, then the table is emptied
//! and refilled in one transaction.
//!
//! # Example
//!
//! ```no_run
//! use citydb_ingest::config::IngestConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::load()?;
//!     let stats = citydb_ingest::refresh(&config).await?;
//!     println!("{} cities loaded into database.", stats.table_rows);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod geonames;

use config::IngestConfig;
use db::Database;
use geonames::{CityPipeline, PipelineStats};

/// Replace the `city` table with the configured dump
///
/// Opens the database, runs the pipeline and closes the database again,
/// whether the run succeeded or not.
pub async fn refresh(config: &IngestConfig) -> anyhow::Result<PipelineStats> {
    config.validate()?;

    let db = Database::connect(&config.database).await?;
    let result = match CityPipeline::with_batch_size(db.pool().clone(), config.load.batch_size) {
        Ok(pipeline) => pipeline.run(&config.load.source_path).await,
        Err(e) => Err(e),
    };
    db.close().await;

    Ok(result?)
}

/// Create the `city` table if it does not exist
pub async fn init(config: &IngestConfig) -> anyhow::Result<()> {
    config.validate()?;

    let db = Database::connect(&config.database).await?;
    let result = CityPipeline::new(db.pool().clone()).init_schema().await;
    db.close().await;

    Ok(result?)
}
