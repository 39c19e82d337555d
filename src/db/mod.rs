use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the process-wide connection pool from DATABASE_URL.
pub async fn connect() -> Result<PgPool, DatabaseError> {
    let url = database_url()?;
    let cfg = &config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
        .connect(&url)
        .await?;

    info!("connected database pool (max_connections={})", cfg.max_connections);
    Ok(pool)
}

/// Lazy variant used by the router constructor: no round trip until the
/// first query, so gate-rejected requests never open a connection.
pub fn connect_lazy() -> Result<PgPool, DatabaseError> {
    let url = database_url()?;
    let cfg = &config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
        .connect_lazy(&url)?;

    Ok(pool)
}

fn database_url() -> Result<String, DatabaseError> {
    let base = std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
    // Parse to fail fast on malformed URLs rather than at first query
    let url = url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    Ok(url.into())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
