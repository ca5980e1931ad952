use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use buncher::config::Config;
use buncher::query::QueryExecutor;
use buncher::server::{self, AppContext};
use buncher::{metrics, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true)
        .init();

    config.validate()?;

    // Initialize metrics
    if let Some(metrics_addr) = config.metrics_addr {
        if let Err(e) = metrics::init_metrics(metrics_addr) {
            warn!("Failed to initialize metrics: {}", e);
        } else {
            info!("Metrics server listening on {}", metrics_addr);
        }
    }

    info!("Starting buncher...");

    let pool = storage::connect(&config.db_url, config.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_url))?;
    let executor = QueryExecutor::new(pool, config.execution_config());
    let context = Arc::new(AppContext::new(executor.clone()));

    server::serve(config.listen_addr()?, context)
        .await
        .context("HTTP server failed")?;

    info!("Shutting down...");
    executor.close().await;
    Ok(())
}
