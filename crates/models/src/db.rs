use anyhow::anyhow;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::{env, time::Duration};
use tracing::info;

use configs::DatabaseConfig;
use migration::MigratorTrait;

/// Connect using `DATABASE_URL` from the environment.
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let url = env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL is not set"))?;
    let db = Database::connect(url).await?;
    Ok(db)
}

/// Connect with pool settings taken from `[database]`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    if cfg.url.trim().is_empty() {
        return Err(anyhow!("database.url is empty"));
    }
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    Ok(db)
}

/// Connect and bring the schema up to date. Migrations are idempotent.
pub async fn connect_and_migrate(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = connect_with_config(cfg).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrated", "database schema up to date");
    Ok(db)
}
