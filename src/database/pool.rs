use crate::config::Config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

fn pool_options(config: &Config) -> PgPoolOptions {
    let mut options = PgPoolOptions::new().max_connections(config.database_max_connections.max(1));
    if let Some(secs) = config.database_acquire_timeout_secs {
        options = options.acquire_timeout(Duration::from_secs(secs));
    }
    options
}

/// Connects eagerly so an unreachable store fails startup.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = pool_options(config).connect(&config.database_url).await?;
    Ok(pool)
}

/// Pool that defers connecting until the first query.
pub fn create_lazy_pool(config: &Config) -> Result<PgPool> {
    let pool = pool_options(config).connect_lazy(&config.database_url)?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
