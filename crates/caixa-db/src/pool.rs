//! # Connection Pool
//!
//! Opens the register's SQLite database and hands out the two repositories
//! the sale screen needs.
//!
//! ```text
//!   DbConfig::for_path("caixa.db")          DbConfig::in_memory()
//!            │                                       │
//!            ▼                                       ▼
//!   WAL + NORMAL sync + FKs, 5 conns       FKs, 1 pinned conn, no idle reap
//!            └──────────────┬────────────────────────┘
//!                           ▼
//!              Database::new(config).await  (migrations applied)
//!                           │
//!              ┌────────────┴────────────┐
//!              ▼                         ▼
//!        db.products()              db.sales()
//!        catalog search             sale recording
//! ```
//!
//! An in-memory database lives exactly as long as its one connection, so
//! that connection is never closed for idleness or age.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

/// Path value that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// How to open the database.
///
/// ```rust
/// use caixa_db::DbConfig;
///
/// let config = DbConfig::for_path("/tmp/caixa.db").max_connections(3);
/// assert_eq!(config.max_connections, 3);
/// assert!(!config.is_in_memory());
///
/// assert!(DbConfig::for_path(":memory:").is_in_memory());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout: Duration,
    /// `None` never reaps idle connections.
    pub idle_timeout: Option<Duration>,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file database. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// A private database that disappears with the pool.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// `in_memory()` for `:memory:`, `new(path)` for anything else.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path == Path::new(IN_MEMORY_PATH) {
            Self::in_memory()
        } else {
            Self::new(path)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .foreign_keys(true);
            return Ok(options);
        }

        // WAL lets the catalog be searched while a sale commits
        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(1)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout);

        if self.is_in_memory() {
            options.max_lifetime(None)
        } else {
            options
        }
    }
}

/// Handle to the register database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening register database"
        );

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The product catalog.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// The sale recorder.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections, then closes the pool. Every
    /// later query fails with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing register database");
        self.pool.close().await;
    }

    pub async fn is_reachable(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_starts_with_empty_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.is_reachable().await);
        assert_eq!(db.products().count().await.unwrap(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_reopens() {
        let path = std::env::temp_dir().join(format!("caixa-test-{}.db", uuid::Uuid::new_v4()));

        let db = Database::new(DbConfig::for_path(&path)).await.unwrap();
        assert!(db.is_reachable().await);
        db.close().await;

        // Migrations are already applied the second time
        let db = Database::new(DbConfig::for_path(&path)).await.unwrap();
        assert!(db.is_reachable().await);
        db.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[test]
    fn test_for_path_picks_pool_shape() {
        let memory = DbConfig::for_path(":memory:");
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
        assert_eq!(memory.idle_timeout, None);

        let file = DbConfig::for_path("/var/lib/caixa/caixa.db").run_migrations(false);
        assert!(!file.is_in_memory());
        assert_eq!(file.max_connections, 5);
        assert!(!file.run_migrations);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unreachable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.is_reachable().await);
    }
}
