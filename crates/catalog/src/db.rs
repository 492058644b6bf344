//! Database connection and pool management.

use exn::ResultExt;
use sqlx::AnyPool;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Schema mirrored from the production catalog, applied to in-memory databases.
const FIXTURE_SCHEMA: &str = include_str!("../fixtures/schema.sql");
// The pipeline walks candidates one at a time; a second connection only
// serves the odd concurrent read.
const MAX_CONNECTIONS: u32 = 2;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Database connection pool for the media catalog.
///
/// Acquired once per run and released exactly once with [`close`](Self::close),
/// on every exit path. Both PostgreSQL (`postgres://`) and SQLite (`sqlite:`)
/// URLs are accepted; the queries stick to the SQL both understand.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to the catalog at the given URL.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self> {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .or_raise(|| ErrorKind::Connect)?;
        Ok(Self { pool })
    }

    /// Connect to an in-memory SQLite catalog with the fixture schema applied
    /// (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        install_default_drivers();
        // In-memory databases must be limited to one connection that never
        // gets recycled, otherwise each connection sees a different database.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .or_raise(|| ErrorKind::Connect)?;
        let db = Self { pool };
        db.apply_fixture_schema().await?;
        Ok(db)
    }

    async fn apply_fixture_schema(&self) -> Result<()> {
        let statements = FIXTURE_SCHEMA
            .split(';')
            .map(|s| s.lines().filter(|l| !l.trim_start().starts_with("--")).collect::<Vec<_>>().join("\n"))
            .filter(|s| !s.trim().is_empty());
        for statement in statements {
            sqlx::query(&statement).execute(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This is useful for running custom queries or transactions.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// This waits for all connections to be returned to the pool and then
    /// closes them. After calling this, the Database instance should not
    /// be used.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
