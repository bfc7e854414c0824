use crate::error::DbError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;

/// Establishes a connection pool to the SQLite database at `storage_path`.
///
/// The file (but not its parent directory) is created when missing. The pool is
/// meant to be created once and shared across the entire application.
pub async fn connect(storage_path: &str) -> Result<SqlitePool, DbError> {
    if storage_path.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "storage path must not be empty".to_string(),
        ));
    }

    let options = SqliteConnectOptions::new()
        .filename(storage_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// A single-connection pool over a private in-memory database.
///
/// Every SQLite in-memory connection is its own database, so the pool is pinned
/// to exactly one connection that is never recycled.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Applies the embedded migrations, creating the `students` table if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
