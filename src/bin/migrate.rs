//! Applies pending SQLx migrations and exits.
//!
//! Migrations are embedded at compile time. The server applies them on
//! startup as well; this binary exists so schema initialization can run
//! independently, e.g. as a deploy step.

use sqlx::postgres::PgPoolOptions;

use smart_notify_backend::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();

    println!("Running database migrations...");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("Migrations completed successfully.");

    Ok(())
}
