use std::sync::Arc;

use tracing::{error, info, warn};

use newsgate::filter;
use newsgate::news::{self, HttpFeedFetcher, PipelineOptions};
use newsgate::web::{AppState, WebServer};
use newsgate::{Config, Database};

/// Default configuration file, overridable by the first argument.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e}");
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> newsgate::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config.validate()?;

    // Initialize logging
    if let Err(e) = newsgate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        newsgate::logging::init_console_only(&config.logging.level);
    }

    info!("newsgate {}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(&config.database).await?;

    let pipeline = if config.ingest.enabled {
        let fetcher = Arc::new(HttpFeedFetcher::new(&config.fetcher)?);
        let sources = config.ingest.sources();
        if sources.is_empty() {
            warn!("No feed sources configured");
        }
        Some(news::configure(
            sources,
            db.pool().clone(),
            fetcher,
            PipelineOptions::from_config(&config),
        )?)
    } else {
        info!("Ingestion disabled");
        None
    };

    let content_filter = filter::from_config(&config.filter)?;
    let state = AppState::new(
        db.pool().clone(),
        Arc::from(content_filter),
        config.comments.max_length,
    );
    let server = WebServer::new(&config.server, state)?;

    let served = server.run(shutdown_signal()).await;

    if let Some(pipeline) = pipeline {
        let report = pipeline.shutdown().await;
        info!(
            "Ingested {} item(s) in {} cycle(s), {} failure(s)",
            report.sink.items_written, report.cycles, report.failures_logged
        );
    }
    db.close().await;

    served?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
