use crate::db::schema::SQLITE_INIT;
use crate::error::SchedulerError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open the scheduler database, creating the file on first run, and
/// initialize the schema.
///
/// The pool is capped at one connection: a transaction owns the connection
/// for its whole lifetime, so multi-statement operations (reserve, cancel)
/// serialize against all other callers instead of failing mid-flight on a
/// SQLite lock upgrade.
pub async fn connect(database_url: &str) -> Result<SqlitePool, SchedulerError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_opts)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Initialize the schema by executing the bundled DDL.
async fn init_schema(pool: &SqlitePool) -> Result<(), SchedulerError> {
    // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

/// True when the database rejected a statement for a UNIQUE or PRIMARY KEY
/// clash.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
