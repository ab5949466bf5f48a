//! Standalone news analysis runner.
//!
//! Default mode sleeps until the next scheduled slot (17:00 and 22:00
//! Asia/Seoul) and runs the full pipeline on every firing. `--once` runs a
//! single cycle immediately and exits, which is also the way to smoke-test
//! the whole flow without waiting for a slot.

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_notify_backend::{
    clients::FcmClient,
    config::{Config, NewsConfig},
    pipeline::NewsPipeline,
    scheduler::NewsAnalysisJob,
    services::{devices::DeviceService, news::NewsService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_notify_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let run_once = std::env::args().any(|arg| arg == "--once");

    // Fail fast on missing credentials before touching the database.
    let news_config = NewsConfig::load()?;
    let config = Config::load();

    let db = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    let fcm = FcmClient::new(&news_config.firebase_credentials_json)?;
    let job = NewsAnalysisJob::new(
        NewsPipeline::new(&news_config),
        NewsService::new(db.clone()),
        DeviceService::new(db),
        fcm,
    );

    if run_once {
        job.run_once().await?;
        return Ok(());
    }

    tracing::info!("News scheduler started, slots at 17:00 and 22:00 KST");
    job.run_scheduled().await
}
