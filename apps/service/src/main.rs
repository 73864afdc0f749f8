#![warn(clippy::all)]

use std::net::SocketAddr;
use std::path::PathBuf;

mod config;
mod database;
mod error;
mod http;
mod orchestrator;
mod pool;

use clap::Parser;
use logger::init_tracing;
use pingmon::{Host, valid_address};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::http::ApiContext;
use crate::orchestrator::Orchestrator;

/// Host availability monitor with an HTTP API
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address for the HTTP API (overrides the config file)
    #[arg(long)]
    http: Option<String>,

    /// Seconds between probe cycles (overrides the config file)
    #[arg(long)]
    interval: Option<u64>,

    /// Seconds before an unanswered probe counts as failed (overrides the
    /// config file)
    #[arg(long)]
    timeout: Option<u64>,

    /// Database file path (overrides the config file)
    #[arg(long)]
    db: Option<String>,

    /// Addresses to start monitoring right away
    #[arg(value_name = "ADDRESS")]
    addresses: Vec<String>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::from_config(cli.config.as_ref())?;
    if let Some(listen) = cli.http {
        config.http.listen = listen;
    }
    if let Some(interval) = cli.interval {
        config.monitor.interval_seconds = interval;
    }
    if let Some(timeout) = cli.timeout {
        config.monitor.timeout_seconds = timeout;
    }
    if let Some(db) = cli.db {
        config.storage.path = db;
    }
    config.validate()?;

    let addr: SocketAddr = config.http.listen.parse()?;

    let pool = pool::create_pool(&config.storage.path).await?;
    let orchestrator = Orchestrator::new(&config, pool).await?;

    for address in cli.addresses {
        if valid_address(&address) {
            orchestrator
                .registry()
                .register_host(Host::new(address, String::new()))
                .await;
        } else {
            warn!("Skipping invalid address from command line: {address}");
        }
    }

    let context = ApiContext {
        registry: orchestrator.registry(),
        history: orchestrator.history(),
    };

    let _handles = orchestrator.spawn();

    info!("Serving HTTP API on {addr}");
    http::run_server(addr, context).await
}
