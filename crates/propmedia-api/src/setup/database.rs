use std::path::Path;
use std::time::Duration;

use propmedia_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await?;

    tracing::info!("Database connection pool established");

    let migrations_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    sqlx::migrate::Migrator::new(migrations_path)
        .await?
        .run(&pool)
        .await?;

    tracing::info!("Database migrations applied");

    Ok(pool)
}
