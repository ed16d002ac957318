//! r2d2 pools over the SQLite queue database.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use vf_core::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Tuning for file-backed pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Connections per process. A worker needs one at a time; the CLI and
    /// tests may hold a few more.
    pub max_size: u32,
    /// How long a write waits on another process's lock before failing with
    /// `SQLITE_BUSY`. Several workers share one queue file, so claims and
    /// status writes routinely contend for the writer lock.
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Open (creating if needed) the queue database at `db_path` with default
/// [`PoolOptions`] and run pending migrations.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    init_pool_with(db_path, PoolOptions::default())
}

/// Like [`init_pool`], with explicit options.
///
/// Every connection gets foreign keys, WAL journaling and the busy timeout.
pub fn init_pool_with(db_path: &str, options: PoolOptions) -> Result<DbPool> {
    let busy_timeout = options.busy_timeout;
    let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;",
        )
    });
    migrated(manager, options.max_size)
}

/// A private shared-cache in-memory database, migrated and ready.
///
/// Each call gets its own database; connections within one pool share it.
pub fn init_memory_pool() -> Result<DbPool> {
    static NEXT_DB: AtomicU64 = AtomicU64::new(0);
    let uri = format!(
        "file:vf_memdb_{}?mode=memory&cache=shared",
        NEXT_DB.fetch_add(1, Ordering::Relaxed)
    );

    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    migrated(manager, PoolOptions::default().max_size)
}

fn migrated(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    migrations::run_migrations(&*get_conn(&pool)?)?;
    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}
