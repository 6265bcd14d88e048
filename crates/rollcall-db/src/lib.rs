//! # Rollcall DB
//!
//! Database pool and schema migrations for the Rollcall API.
//!
//! The schema lives in the workspace `migrations/` directory and is embedded at
//! compile time, so the server binary carries its own migrations.
//!
//! # Example
//!
//! ```ignore
//! use rollcall_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&std::env::var("DATABASE_URL").unwrap()).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connects a PostgreSQL pool.
///
/// `DATABASE_MAX_CONNECTIONS` overrides the pool size.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    tracing::info!(max_connections, "Connecting to database");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Round-trips a trivial query; used by the health endpoint.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
