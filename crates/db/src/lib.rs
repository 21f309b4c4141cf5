use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, Executor, Pool, Sqlite, Transaction,
    migrate::MigrateError,
    sqlite::{
        SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
        SqliteSynchronous,
    },
};
use thiserror::Error;
use tracing::info;

pub mod models;
pub mod ownership;
pub mod position;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ownership::{Ownership, OwnershipResolver, Resource};
pub use position::{PositionScope, PositionSequencer};

pub type Tx<'a> = Transaction<'a, Sqlite>;

/// SQLite benefits from limited connections due to its single-writer model.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// How long a writer waits on a locked database before giving up.
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;

const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

/// Max pool size from `TASKBOARD_SQLITE_MAX_CONNECTIONS` (1..=100), default 10.
pub fn get_max_connections() -> u32 {
    std::env::var("TASKBOARD_SQLITE_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= 100)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Applied on every new connection via `after_connect`.
async fn apply_performance_pragmas(conn: &mut SqliteConnection) -> Result<(), Error> {
    // temp_store = MEMORY (2)
    conn.execute("PRAGMA temp_store = 2").await?;
    // 16MB page cache (negative means KB)
    conn.execute("PRAGMA cache_size = -16000").await?;
    Ok(())
}

pub(crate) fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS)))
}

pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Handle to the board database, constructed once at startup and handed to
/// every service.
#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open (creating if needed) the database at `database_url` and apply
    /// pending migrations.
    pub async fn new(database_url: &str) -> Result<DBService, DbError> {
        let max_connections = get_max_connections();

        info!(
            max_connections,
            min_connections = DEFAULT_MIN_CONNECTIONS,
            "Initializing SQLite connection pool"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(DEFAULT_MIN_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS))
            .idle_timeout(Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)))
            .after_connect(|conn, _meta| {
                Box::pin(async move { apply_performance_pragmas(conn).await })
            })
            .connect_with(connect_options(database_url)?)
            .await?;

        migrate(&pool).await?;
        info!("Database migrations applied");

        Ok(DBService { pool })
    }

    /// Wrap an already-migrated pool.
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Deferred transaction for consistent multi-statement reads.
    pub async fn begin(&self) -> Result<Tx<'static>, Error> {
        self.pool.begin().await
    }

    /// `BEGIN IMMEDIATE`: takes the write lock up front so concurrent writers
    /// wait on the busy timeout. A deferred transaction that reads and then
    /// writes fails its lock upgrade with `SQLITE_BUSY` without waiting.
    pub async fn begin_write(&self) -> Result<Tx<'static>, Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    /// Cheap connectivity check for the health endpoint.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
