use anyhow::{bail, Context, Result};
use posts_service::config::Config;
use posts_service::db;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TABLES: &[&str] = &["users", "post_groups", "posts", "comments", "follows"];

#[derive(Debug, Serialize)]
struct TableCount {
    table: &'static str,
    rows: i64,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "posts_service=info,sqlx=warn".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn table_counts(pool: &PgPool) -> Result<Vec<TableCount>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for &table in TABLES {
        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .with_context(|| format!("Failed to count rows in {}", table))?;
        counts.push(TableCount { table, rows });
    }
    Ok(counts)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.app.json_logs);

    let command = std::env::args().nth(1).unwrap_or_else(|| "migrate".to_string());
    info!(env = %config.app.env, command = %command, "Starting posts-service");

    let pool = db::init_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    match command.as_str() {
        "migrate" => {
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
        }
        "check" => {
            if config.app.run_migrations {
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
            }
            let counts = table_counts(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        other => bail!("Unknown command '{}': expected 'migrate' or 'check'", other),
    }

    pool.close().await;
    info!("posts-service finished");
    Ok(())
}
