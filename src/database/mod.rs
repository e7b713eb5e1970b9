pub mod models;
pub mod queries;
pub mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

/// How long a writer waits for the database lock before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

impl Database {
    /// File-backed pool. Writers queue on the SQLite lock for up to
    /// [`BUSY_TIMEOUT`]; WAL lets readers proceed while a writer holds it.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        Self::with_busy_timeout(database_url, max_connections, BUSY_TIMEOUT).await
    }

    pub async fn with_busy_timeout(
        database_url: &str,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Connected to {}", database_url);
        Ok(Database { pool })
    }

    /// In-memory database; a single connection is kept alive for the pool's
    /// lifetime since every SQLite memory connection is its own database.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Database { pool };
        database.run_migrations().await?;
        Ok(database)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        for (name, sql) in schema::MIGRATIONS {
            sqlx::raw_sql(*sql).execute(&self.pool).await?;
            debug!("Applied migration {}", name);
        }

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
