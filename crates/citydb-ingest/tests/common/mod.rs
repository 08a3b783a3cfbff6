//! Shared helpers for citydb integration tests
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use citydb_ingest::db::{Database, DbConfig};
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

/// One row of the `city` table, decoded with the store's types
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CityRow {
    pub geonameid: i64,
    pub name: String,
    pub asciiname: Option<String>,
    pub alternatenames: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub feature_class: String,
    pub feature_code: String,
    pub country_code: String,
    pub cc2: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub admin3: Option<String>,
    pub admin4: Option<String>,
    pub population: i64,
    pub elevation: Option<i64>,
    pub dem: Option<i64>,
    pub timezone: String,
    pub modification_date: NaiveDate,
}

/// Fields of a well-formed dump line for `id`
pub fn city_fields(id: u32) -> Vec<String> {
    vec![
        id.to_string(),
        format!("City {}", id),
        format!("City {}", id),
        format!("Ciudad {},Stadt {}", id, id),
        format!("{}.5", id % 90),
        "1.25".to_string(),
        "P".to_string(),
        "PPL".to_string(),
        "AD".to_string(),
        String::new(),
        "02".to_string(),
        String::new(),
        String::new(),
        String::new(),
        (1000 + id).to_string(),
        "1240".to_string(),
        "1721".to_string(),
        "Europe/Andorra".to_string(),
        "2012-11-03".to_string(),
    ]
}

pub fn city_line(id: u32) -> String {
    city_fields(id).join("\t")
}

/// Dump line for `id` with one field replaced
pub fn city_line_with(id: u32, index: usize, value: &str) -> String {
    let mut fields = city_fields(id);
    fields[index] = value.to_string();
    fields.join("\t")
}

/// Dump containing ids `ids` in order
pub fn dump_for(ids: impl IntoIterator<Item = u32>) -> String {
    ids.into_iter()
        .map(|id| city_line(id) + "\n")
        .collect()
}

/// Temporary directory holding a database and dump files
pub struct TestEnv {
    pub db: Database,
    pub dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::connect(&DbConfig::for_path(dir.path().join("cities.db")))
            .await
            .expect("open database");
        Self { db, dir }
    }

    pub fn pool(&self) -> SqlitePool {
        self.db.pool().clone()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("cities.db")
    }

    /// Write `contents` to a dump file in the temp dir
    pub fn write_dump(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write dump");
        path
    }
}

pub async fn fetch_rows(pool: &SqlitePool) -> Vec<CityRow> {
    sqlx::query_as::<_, CityRow>("SELECT * FROM city ORDER BY geonameid")
        .fetch_all(pool)
        .await
        .expect("select cities")
}

pub async fn row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM city")
        .fetch_one(pool)
        .await
        .expect("count cities")
}
