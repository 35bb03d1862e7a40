//! Database module for newsgate.
//!
//! Wraps the sqlx connection pool shared by the ingestion sink, the query
//! engine and the comment store, and applies schema migrations on open.

mod schema;

pub use schema::{MIGRATIONS, UNIQUE_LINK_INDEX};

use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::{NewsError, Result};

/// Connection pool type for the compiled backend.
#[cfg(feature = "sqlite")]
pub type DbPool = sqlx::SqlitePool;

/// Connection pool type for the compiled backend.
#[cfg(feature = "postgres")]
pub type DbPool = sqlx::PgPool;

/// Database wrapper owning the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect using an explicit configuration and apply migrations.
    ///
    /// When `config.unique_links` is set the unique link index is created as
    /// well; this fails if the table already holds duplicate links.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Opening database at {}", redact_url(&config.url));

        let pool = Self::create_pool(config).await?;
        let db = Self { pool };
        db.migrate().await?;

        if config.unique_links {
            db.enforce_unique_links().await?;
        }

        Ok(db)
    }

    #[cfg(feature = "sqlite")]
    async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
        use std::str::FromStr;
        use std::time::Duration;

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| NewsError::DatabaseConnection(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // Create parent directories if they don't exist
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| NewsError::DatabaseConnection(e.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| NewsError::DatabaseConnection(e.to_string()))
    }

    /// Open an in-memory database for testing.
    ///
    /// The pool holds exactly one connection that is never recycled, so the
    /// in-memory database lives as long as the returned value.
    #[cfg(feature = "sqlite")]
    pub async fn open_in_memory() -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        debug!("Opening in-memory database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| NewsError::DatabaseConnection(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| NewsError::DatabaseConnection(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Close every connection in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        if !self.table_exists("schema_version").await? {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;

        if current_version as usize >= MIGRATIONS.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            MIGRATIONS.len()
        );

        sqlx::raw_sql(schema::SCHEMA_VERSION_TABLE)
            .execute(&self.pool)
            .await?;

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            debug!("Applying migration v{}", version);

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        info!(
            "Database migration complete (now at version {})",
            MIGRATIONS.len()
        );
        Ok(())
    }

    /// Create the unique index on `news.link`.
    pub async fn enforce_unique_links(&self) -> Result<()> {
        sqlx::query(UNIQUE_LINK_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                NewsError::Database(format!("cannot enforce unique links: {}", e))
            })?;
        info!("Unique origin links enforced");
        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        #[cfg(feature = "sqlite")]
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1";
        #[cfg(feature = "postgres")]
        let sql = "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = $1";

        let count: i64 = sqlx::query_scalar(sql)
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

/// Hide the password part of a connection URL for logging.
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}
