use crate::config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

/// Schema shipped with the binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Tables the inventory store reads and writes
pub const INVENTORY_TABLES: [&str; 8] = [
    "users",
    "brands",
    "categories",
    "firms",
    "products",
    "purchases",
    "sells",
    "stock_movements",
];

/// Failures while bringing the inventory database up
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Could not open inventory database: {0}")]
    Connect(sqlx::Error),

    #[error("Timed out waiting for an inventory database connection")]
    Timeout,

    #[error("Inventory migration failed: {0}")]
    Migration(#[from] MigrateError),

    #[error("Inventory schema is missing table `{0}`")]
    MissingTable(&'static str),

    #[error("Inventory database is not answering: {0}")]
    Unavailable(sqlx::Error),
}

/// Open the pool every Postgres repository shares.
///
/// Each connection is pinned to UTC so `NOW()` and the bound
/// `NaiveDateTime`s from the sweeper agree regardless of the server default.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET TIME ZONE 'UTC'").execute(conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .map_err(|e| match e {
            sqlx::Error::PoolTimedOut => DatabaseError::Timeout,
            other => DatabaseError::Connect(other),
        })
}

/// Apply pending migrations, then confirm every inventory table is present
pub async fn prepare(pool: &PgPool) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    verify_schema(pool).await
}

/// Fail with the first inventory table the current schema lacks
pub async fn verify_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables WHERE table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::Unavailable)?;

    match INVENTORY_TABLES
        .iter()
        .find(|table| !present.iter().any(|p| p == *table))
    {
        Some(missing) => Err(DatabaseError::MissingTable(missing)),
        None => Ok(()),
    }
}

/// Cheap read against the products table
pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1 FROM products LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::Unavailable)?;
    Ok(())
}
