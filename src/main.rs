//! Strata - hierarchical agent pipeline
//!
//! CLI entry point for the Strata server.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use strata::server::{self, config::LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let config = server::load_config().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "strata=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    // stdout is reserved for `ask` and `tools` output
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    cli::run(cli, config).await
}
