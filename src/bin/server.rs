// src/bin/server.rs

//! Result server entry point.
//!
//! Loads configuration, connects the cache (degrading to no caching when
//! Redis is down), and serves the HTTP API until Ctrl-C. In-flight bulk
//! workers are drained before exit.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use result_crawler::cache::ResultCache;
use result_crawler::error::Result;
use result_crawler::models::Config;
use result_crawler::services::{ListingScraper, ResultScraper};
use result_crawler::utils::http::create_async_client;
use result_crawler::utils::log::{self, LogFormat};
use result_crawler::web::{AppState, create_app};

#[derive(Parser, Debug)]
#[command(
    name = "result-server",
    version,
    about = "Cached HTTP API over the examination result portal"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    /// Override the listen address, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    log::init(format, cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    config.validate()?;
    let config = Arc::new(config);

    let client = create_async_client(&config.portal)?;
    let listings = Arc::new(ListingScraper::new(Arc::clone(&config), client.clone()));
    let results = Arc::new(ResultScraper::new(
        Arc::clone(&config),
        client,
        listings.clone(),
    ));
    let cache = ResultCache::from_config_graceful(&config.cache).await;

    let state = Arc::new(AppState::new(Arc::clone(&config), cache, results, listings));
    let bulk = state.bulk.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!(address = %config.server.bind_address, "Result server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(in_flight = bulk.in_flight(), "Shutting down, draining bulk workers");
    bulk.drain().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
