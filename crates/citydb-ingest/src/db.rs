//! SQLite connection handling
//!
//! [`Database`] is the single handle a run works through. It is opened at
//! the start of a command and closed on every exit path.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default database location, relative to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite:cities.db";

/// One connection: a load is a single writer
pub const DEFAULT_MAX_CONNECTIONS: u32 = 1;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database configuration error: {0}. Check CITYDB_DATABASE_URL.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite URL, e.g. `sqlite:cities.db` or `sqlite:///var/lib/citydb/cities.db`
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DbConfig {
    /// Read `CITYDB_DATABASE_URL`, `CITYDB_DB_MAX_CONNECTIONS` and
    /// `CITYDB_DB_CONNECT_TIMEOUT`, falling back to defaults.
    pub fn from_env() -> Self {
        let url = std::env::var("CITYDB_DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let max_connections = std::env::var("CITYDB_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let connect_timeout_secs = std::env::var("CITYDB_DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Self {
            url,
            max_connections,
            connect_timeout_secs,
        }
    }

    /// Point the configuration at a database file
    pub fn for_path(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            url: format!("sqlite://{}", path.as_ref().display()),
            ..Self::default()
        }
    }
}

/// Open database handle
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating the file if needed) the configured database
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        if config.max_connections == 0 {
            return Err(DbError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await?;

        debug!(url = %config.url, "Database connection pool established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection, waiting for in-flight work to finish
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Database connection pool closed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.url, "sqlite:cities.db");
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
    }

    #[test]
    fn test_for_path() {
        let config = DbConfig::for_path("/tmp/citydb/cities.db");
        assert_eq!(config.url, "sqlite:///tmp/citydb/cities.db");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.db");

        let db = Database::connect(&DbConfig::for_path(&path)).await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(one, 1);
        db.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_zero_connections_rejected() {
        let config = DbConfig {
            max_connections: 0,
            ..DbConfig::default()
        };
        assert!(matches!(
            Database::connect(&config).await,
            Err(DbError::Config(_))
        ));
    }
}
