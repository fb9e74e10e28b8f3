use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::application::ports::database_health::DatabaseHealth;
use crate::bootstrap::config::Config;

pub mod repositories;

pub type PgPool = Pool<Postgres>;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect_pool(cfg: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database_max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&cfg.database_url)
        .await
        .context("connecting to DATABASE_URL")?;
    tracing::info!(
        max_connections = cfg.database_max_connections,
        "database_pool_ready"
    );
    Ok(pool)
}

/// Brings the `users`, `user_profiles` and `token_blacklist` tables up to
/// date from the migrations embedded at build time.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    migrator
        .run(pool)
        .await
        .context("running account migrations")?;
    tracing::info!(migrations = migrator.iter().count(), "database_schema_current");
    Ok(())
}

pub struct PgDatabaseHealth {
    pool: PgPool,
}

impl PgDatabaseHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseHealth for PgDatabaseHealth {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
