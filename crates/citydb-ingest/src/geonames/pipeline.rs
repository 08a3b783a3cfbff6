// GeoNames Pipeline Orchestration
//
// Full refresh of the `city` table from one dump file:
// 1. Ensure the table exists
// 2. Parse the whole file into memory (any error leaves the table untouched)
// 3. Delete + batch insert in one transaction (any error rolls back)
// 4. Count the rows now in the table

use sqlx::sqlite::SqlitePool;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use super::{CityStorage, GeonamesParser, Result};

/// Where a run currently is
///
/// `LoadInProgress` only exists inside the load transaction; outside
/// observers see the table either before or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    SchemaReady,
    LoadInProgress,
    LoadComplete,
    RolledBack,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::SchemaReady => "schema_ready",
            PipelineState::LoadInProgress => "load_in_progress",
            PipelineState::LoadComplete => "load_complete",
            PipelineState::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Counts reported after a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records read from the dump
    pub parsed: usize,
    /// Rows removed before the insert
    pub deleted: u64,
    pub inserted: usize,
    pub batches: usize,
    /// `SELECT COUNT(*)` after commit
    pub table_rows: i64,
}

/// GeoNames cities ingestion pipeline
pub struct CityPipeline {
    parser: GeonamesParser,
    storage: CityStorage,
}

impl CityPipeline {
    /// Create pipeline with the default batch size
    pub fn new(db: SqlitePool) -> Self {
        Self {
            parser: GeonamesParser::new(),
            storage: CityStorage::new(db),
        }
    }

    pub fn with_batch_size(db: SqlitePool, batch_size: usize) -> Result<Self> {
        Ok(Self {
            parser: GeonamesParser::new(),
            storage: CityStorage::with_batch_size(db, batch_size)?,
        })
    }

    /// Only create the table
    pub async fn init_schema(&self) -> Result<()> {
        self.storage.ensure_schema().await?;
        debug!(state = %PipelineState::SchemaReady);
        Ok(())
    }

    /// Run the full refresh from `source`
    #[instrument(skip(self, source), fields(source = %source.display()))]
    pub async fn run(&self, source: &Path) -> Result<PipelineStats> {
        debug!(state = %PipelineState::Uninitialized);
        self.init_schema().await?;

        let parsed = self.parser.parse_file(source)?;

        debug!(state = %PipelineState::LoadInProgress);
        let load = match self.storage.replace_all(&parsed.records).await {
            Ok(load) => load,
            Err(e) => {
                if e.is_rolled_back() {
                    warn!(state = %PipelineState::RolledBack, error = %e, "Load aborted");
                }
                return Err(e);
            },
        };
        debug!(state = %PipelineState::LoadComplete);

        let table_rows = self.storage.count().await?;

        info!(
            parsed = parsed.count(),
            inserted = load.inserted,
            table_rows,
            "City refresh complete"
        );

        Ok(PipelineStats {
            parsed: parsed.count(),
            deleted: load.deleted,
            inserted: load.inserted,
            batches: load.batches,
            table_rows,
        })
    }
}
