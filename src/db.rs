//! SQLite pool setup and startup migrations.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::errors::AppError;
use crate::queries::Schema;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Build the connection pool.
///
/// SQLite leaves foreign keys off per connection, so the cascade rules in
/// the schema only apply with the pragma set on every checkout.
pub fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let manager = SqliteConnectionManager::file(database_url)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| AppError::DatabaseError(format!("Failed to create pool: {}", e)))
}

/// Create any missing tables and indexes.
pub fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    let conn = get_conn(pool)?;

    for (name, ddl) in [
        ("users", Schema::CREATE_USERS_TABLE),
        ("api_keys", Schema::CREATE_API_KEYS_TABLE),
        ("links", Schema::CREATE_LINKS_TABLE),
        ("slug index", Schema::CREATE_SLUG_INDEX),
        ("click_logs", Schema::CREATE_CLICK_LOGS_TABLE),
    ] {
        conn.execute(ddl, [])
            .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", name, e)))?;
    }

    log::info!("Database migrations completed");
    Ok(())
}

pub fn get_conn(pool: &DbPool) -> Result<DbConnection, AppError> {
    pool.get()
        .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
}
