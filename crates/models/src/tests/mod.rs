/// Project/issue CRUD helpers against a live database
pub mod crud_tests;


use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// DB tests need a reachable Postgres; skip when none is configured.
pub(crate) fn skip_db_tests() -> bool {
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

/// Setup test database with migrations
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
