//! Postgres access for the feedback service.
//!
//! Exposes the connection pool helpers, the schema bootstrap, the
//! parameterized query builder, and the feedback repository.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod query;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Schema script shared by the migrator and [`ensure_schema`].
const SCHEMA_SQL: &str = include_str!("../../../db/migrations/20260101000000_feedback_schema.sql");

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Create or upgrade the feedback schema in place.
///
/// Runs the schema script directly, outside the migration ledger. Every
/// statement in it is idempotent, so this is safe to call repeatedly and on
/// databases that were migrated normally.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    tracing::info!("Feedback schema ensured");
    Ok(())
}
