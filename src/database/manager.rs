use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::MAX_CONTENT_CHARS;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("content is {chars} characters long, the limit is {max}")]
    ContentTooLong { chars: usize, max: usize },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

fn create_message_table() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS message (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content VARCHAR({max}) NOT NULL CHECK (length(content) <= {max}),
    created_at DATETIME NOT NULL
)",
        max = MAX_CONTENT_CHARS
    )
}

/// Owns the connection pool for the board's database
#[derive(Clone, Debug)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open the database at `config.url` and create the schema if it is missing.
    ///
    /// In-memory URLs (`sqlite::memory:`) are pinned to a single connection
    /// that never expires, otherwise every pooled connection would see its
    /// own empty database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let options = SqliteConnectOptions::from_str(&config.url)?;
        let pool = if Self::is_memory_url(&config.url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .connect_with(options)
                .await?
        };

        let manager = Self { pool };
        manager.create_schema().await?;
        info!("Opened message database: {}", config.url);
        Ok(manager)
    }

    /// Fresh private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(&create_message_table()).execute(&self.pool).await?;
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed message database pool");
    }

    fn is_memory_url(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
