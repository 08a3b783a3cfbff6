// City Storage Layer
//
// Owns the `city` table: creates it when missing and replaces its contents
// with a freshly parsed dump inside a single transaction.

use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracing::{debug, error, info};

use super::models::{GeoRecord, GEONAME_FIELDS};
use super::{GeonamesError, Result, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};

/// Destination table name
pub const CITY_TABLE: &str = "city";

// STRICT makes SQLite coerce text into INTEGER/REAL columns and reject
// values that cannot be converted.
const CREATE_CITY_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS city (
        geonameid         INTEGER NOT NULL PRIMARY KEY,
        name              TEXT    NOT NULL,
        asciiname         TEXT,
        alternatenames    TEXT,
        latitude          REAL    NOT NULL,
        longitude         REAL    NOT NULL,
        feature_class     TEXT    NOT NULL,
        feature_code      TEXT    NOT NULL,
        country_code      TEXT    NOT NULL,
        cc2               TEXT,
        admin1            TEXT,
        admin2            TEXT,
        admin3            TEXT,
        admin4            TEXT,
        population        INTEGER NOT NULL,
        elevation         INTEGER,
        dem               INTEGER,
        timezone          TEXT    NOT NULL,
        modification_date TEXT    NOT NULL
    ) STRICT
"#;

/// Outcome of a successful replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows removed by the delete step
    pub deleted: u64,
    /// Rows inserted
    pub inserted: usize,
    /// INSERT statements issued
    pub batches: usize,
}

/// Storage handler for the `city` table
pub struct CityStorage {
    db: SqlitePool,
    batch_size: usize,
}

impl CityStorage {
    /// Create storage handler with the default batch size
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Create storage handler with a custom batch size
    ///
    /// Accepts `1..=MAX_BATCH_SIZE`, which keeps every INSERT under the
    /// bind-parameter limit.
    pub fn with_batch_size(db: SqlitePool, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(GeonamesError::Config(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if batch_size > MAX_BATCH_SIZE {
            return Err(GeonamesError::Config(format!(
                "Batch size too large ({} > {})",
                batch_size, MAX_BATCH_SIZE
            )));
        }

        Ok(Self { db, batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Create the `city` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_CITY_TABLE)
            .execute(&self.db)
            .await
            .map_err(GeonamesError::Schema)?;

        debug!(table = CITY_TABLE, "City table ready");
        Ok(())
    }

    /// Replace the whole table with `records`
    ///
    /// Delete and every batch insert share one transaction. If any batch
    /// fails the transaction is rolled back and the previous rows stay.
    pub async fn replace_all(&self, records: &[GeoRecord]) -> Result<LoadStats> {
        let total_batches = records.len().div_ceil(self.batch_size);
        info!(
            records = records.len(),
            batch_size = self.batch_size,
            batches = total_batches,
            "Replacing city table"
        );

        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query("DELETE FROM city")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!(deleted, "Cleared city table");

        let mut inserted = 0;
        for (batch_idx, chunk) in records.chunks(self.batch_size).enumerate() {
            debug!(
                "Inserting batch {} / {} ({} rows)",
                batch_idx + 1,
                total_batches,
                chunk.len()
            );

            if let Err(source) = insert_batch(&mut tx, chunk).await {
                error!(
                    batch = batch_idx + 1,
                    error = %source,
                    "Batch insert failed, rolling back"
                );
                // A failed rollback still leaves the previous rows: SQLite
                // discards an uncommitted transaction with its connection
                if let Err(rollback_err) = tx.rollback().await {
                    error!(
                        batch = batch_idx + 1,
                        error = %rollback_err,
                        "Rollback failed, dropping transaction"
                    );
                }
                return Err(GeonamesError::StoreConstraint {
                    batch: batch_idx + 1,
                    source,
                });
            }

            inserted += chunk.len();
        }

        tx.commit().await?;

        info!(deleted, inserted, "City table replaced");

        Ok(LoadStats {
            deleted,
            inserted,
            batches: total_batches,
        })
    }

    /// Number of rows currently in the table
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM city")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

/// One multi-row INSERT for a chunk, columns in file order
async fn insert_batch(
    tx: &mut Transaction<'_, Sqlite>,
    records: &[GeoRecord],
) -> std::result::Result<(), sqlx::Error> {
    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("INSERT INTO city ({}) ", GEONAME_FIELDS.join(", ")));

    query_builder.push_values(records, |mut b, record| {
        b.push_bind(record.geonameid.as_deref())
            .push_bind(record.name.as_deref())
            .push_bind(record.asciiname.as_deref())
            .push_bind(record.alternatenames.as_deref())
            .push_bind(record.latitude.as_deref())
            .push_bind(record.longitude.as_deref())
            .push_bind(record.feature_class.as_deref())
            .push_bind(record.feature_code.as_deref())
            .push_bind(record.country_code.as_deref())
            .push_bind(record.cc2.as_deref())
            .push_bind(record.admin1.as_deref())
            .push_bind(record.admin2.as_deref())
            .push_bind(record.admin3.as_deref())
            .push_bind(record.admin4.as_deref())
            .push_bind(record.population.as_deref())
            .push_bind(record.elevation.as_deref())
            .push_bind(record.dem.as_deref())
            .push_bind(record.timezone.as_deref())
            .push_bind(record.modification_date);
    });

    query_builder.build().execute(&mut **tx).await?;

    Ok(())
}
