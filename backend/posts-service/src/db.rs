//! Database pool and schema migrations

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::error::ServiceResult;

/// Embedded schema: users, post_groups, posts, comments, follows
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Close connections idle for longer than this
const IDLE_TIMEOUT_SECS: u64 = 600;
/// Recycle connections after this lifetime
const MAX_LIFETIME_SECS: u64 = 1800;

/// Create a PostgreSQL connection pool and verify it answers queries
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, min={}, acquire_timeout={}s, verify_timeout={}s",
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
        config.connect_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
        .max_lifetime(Duration::from_secs(MAX_LIFETIME_SECS))
        .connect(&config.url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!("Database pool created and verified");
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timed out"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> ServiceResult<()> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
