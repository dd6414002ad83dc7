//! Pooled SQLite handles for concurrent request handling.
//!
//! # Responsibility
//! - Hand out independently usable connections to concurrent callers.
//! - Run migrations once, before the pool is returned.
//!
//! # Invariants
//! - Every pooled connection is configured like [`super::open_db`].
//! - The in-memory pool holds exactly one connection; each in-memory
//!   SQLite connection is a separate database.

use super::migrations::apply_migrations;
use super::open::configure_connection;
use super::DbResult;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Instant;

/// Shared storage handle injected into repositories.
pub type DbPool = Pool<SqliteConnectionManager>;

/// A connection checked out of [`DbPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const FILE_POOL_SIZE: u32 = 4;

/// Opens a pooled file database and applies all pending migrations.
pub fn open_pool(path: impl AsRef<Path>) -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| configure_connection(conn));
    build_pool("file", manager, Pool::builder().max_size(FILE_POOL_SIZE))
}

/// Opens a single-connection in-memory pool and applies all pending migrations.
pub fn open_pool_in_memory() -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| configure_connection(conn));
    // Recycling the only connection would drop the database with it.
    let builder = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None);
    build_pool("memory", manager, builder)
}

fn build_pool(
    mode: &str,
    manager: SqliteConnectionManager,
    builder: r2d2::Builder<SqliteConnectionManager>,
) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!("event=db_pool_open module=db status=start mode={mode}");

    let result = init_pool(manager, builder);
    match &result {
        Ok(_) => info!(
            "event=db_pool_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_pool_open module=db status=error mode={} duration_ms={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn init_pool(
    manager: SqliteConnectionManager,
    builder: r2d2::Builder<SqliteConnectionManager>,
) -> DbResult<DbPool> {
    let pool = builder.build(manager)?;
    {
        let mut conn = pool.get()?;
        apply_migrations(&mut conn)?;
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::{open_pool, open_pool_in_memory};

    #[test]
    fn pooled_connections_enable_foreign_keys() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn file_pool_shares_schema_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(dir.path().join("catalog.sqlite3")).unwrap();

        let first = pool.get().unwrap();
        let second = pool.get().unwrap();
        first
            .execute("INSERT INTO categories (name) VALUES ('fashion');", [])
            .unwrap();
        let count: i64 = second
            .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
