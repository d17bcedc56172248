use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

fn connect_options(settings: &DatabaseSettings) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(&settings.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // SQLite serializes writers; concurrent inserts wait on the lock instead of failing.
        .busy_timeout(settings.connect_timeout())
}

fn pool_options(settings: &DatabaseSettings) -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout())
}

/// Establishes a connection pool to the SQLite database file.
///
/// The file is created if it does not exist yet, but its directory must. At
/// least one connection is opened before returning, so an unreachable store is
/// reported here as [`DbError::ConnectionError`] rather than on first use.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    let pool = pool_options(settings)
        .connect_with(connect_options(settings))
        .await
        .map_err(DbError::ConnectionError)?;

    tracing::info!(path = %settings.path.display(), "Connected to SQLite database");
    Ok(pool)
}

/// Builds the pool without touching the store. Connection failures surface
/// from the first query instead.
pub fn connect_lazy(settings: &DatabaseSettings) -> SqlitePool {
    pool_options(settings).connect_lazy_with(connect_options(settings))
}

/// Ensures the `weighins` and `runs` tables exist.
///
/// Every statement in the embedded migration is create-if-absent, and sqlx
/// records applied migrations, so calling this on every startup is a no-op
/// once the schema is in place. It never alters an existing table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
