//! TrustTrip API: entry point.
//!
//! Serves the trip crowdfunding REST API over SQLite and runs a background
//! task that evicts expired login nonces.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod lifecycle;
mod seed;
mod sweeper;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set; signing sessions with the development secret");
    }

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    if config.seed_demo {
        seed::seed_demo(&pool).await;
    }

    // ─── Background nonce sweeper ─────────────────────────
    tokio::spawn(sweeper::run(pool.clone(), config.nonce_sweep_interval_secs));

    // ─── REST API ─────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.api_port);
    let app = api::router(api::ApiState { pool, config });
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
