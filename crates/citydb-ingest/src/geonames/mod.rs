// GeoNames Cities Ingestion Module
//
// Loads a GeoNames "cities" dump (cities500.txt, cities5000.txt, ...) into
// the `city` table as a full refresh.
//
// Layout follows the other ingest sources:
// - Models: record shape and column order
// - Parse: tab-delimited UTF-8 reader
// - Store: schema bootstrap + transactional batch replace
// - Pipeline: orchestration and counts
//
// Data source: https://download.geonames.org/export/dump/

pub mod models;
pub mod parser;
pub mod pipeline;
pub mod storage;

pub use models::{GeoRecord, FIELD_COUNT, GEONAME_FIELDS};
pub use parser::{GeonamesParser, ParsedCities};
pub use pipeline::{CityPipeline, PipelineState, PipelineStats};
pub use storage::{CityStorage, LoadStats};

/// Rows per INSERT statement
///
/// Each row binds one parameter per column, so a batch binds
/// `batch_size * FIELD_COUNT` parameters.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Largest batch accepted by configuration and [`CityStorage`]
///
/// `MAX_BATCH_SIZE * FIELD_COUNT` stays below [`SQLITE_MAX_VARIABLES`], so a
/// batch size that passes validation never hits the bind-parameter limit.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// `SQLITE_MAX_VARIABLE_NUMBER` of the SQLite that sqlx bundles through
/// `libsqlite3-sys`. Stock SQLite builds default to 32766.
pub const SQLITE_MAX_VARIABLES: usize = 250_000;

/// Format of the trailing `modification_date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result type for GeoNames operations
pub type Result<T> = std::result::Result<T, GeonamesError>;

/// Error types for GeoNames ingestion
#[derive(Debug, thiserror::Error)]
pub enum GeonamesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid UTF-8 on line {line}: {message}")]
    Encoding { line: u64, message: String },

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Failed to create city table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Insert of batch {batch} failed, load rolled back: {source}")]
    StoreConstraint {
        batch: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GeonamesError {
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// The failure happened while reading the source file, before the
    /// table was touched.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Encoding { .. } | Self::MalformedRecord { .. }
        )
    }

    /// The load transaction was rolled back; the table holds its pre-run rows.
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::StoreConstraint { .. })
    }
}

impl From<csv::Error> for GeonamesError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => GeonamesError::Io(e),
            csv::ErrorKind::Utf8 { err, .. } => GeonamesError::Encoding {
                line,
                message: err.to_string(),
            },
            other => GeonamesError::malformed(line, format!("{:?}", other)),
        }
    }
}
