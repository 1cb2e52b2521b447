//! PostgreSQL connection
//!
//! Opens the pool once at startup and applies the schema migrations.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Create the connection pool and apply pending migrations
pub async fn connect(database_url: &str) -> Result<PgPool> {
    info!(url = %mask_database_url(database_url), "Connecting to database");

    let pool = DatabaseConfig::new(database_url).create_pool().await?;
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply the SQL migrations shipped in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Hide credentials when logging the database URL
fn mask_database_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(scheme_end) = url.find("://") {
            let protocol = &url[..scheme_end + 3];
            let host = &url[at_pos + 1..];
            return format!("{}***:***@{}", protocol, host);
        }
    }
    url.to_string()
}
