//! Connection pool
//!
//! The pool is owned by [`Store`](super::Store); nothing in the crate keeps
//! a global one.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::config::DatabaseConfig;

/// Open a pool capped at `max_connections`.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Open a pool from the `[database]` config section.
pub async fn create_pool_from_config(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(max_connections = config.max_connections, "Opening connection pool");
    create_pool_with_options(&config.url, config.max_connections).await
}
