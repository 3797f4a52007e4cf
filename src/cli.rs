//! Command line interface
//!
//! - `serve`: start the HTTP server (default)
//! - `ask`: run one query through the pipeline and print the answer
//! - `tools`: list the registered tools

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::sync::Arc;
use strata::server::{self, config::AppConfig};
use strata_core::{event_stream, BatchOutcome};
use strata_llm::OfflineProvider;

/// Strata agent pipeline
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Hierarchical agent pipeline with streaming answers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Answer a single query
    Ask {
        /// The question to answer
        query: String,
        /// Print each pipeline event as it happens
        #[arg(long)]
        stream: bool,
    },
    /// List available tools
    Tools,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::run(config).await,
        Commands::Ask { query, stream } => ask(&config, &query, stream).await,
        Commands::Tools => list_tools(&config),
    }
}

async fn ask(config: &AppConfig, query: &str, stream: bool) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Query is required");
    }

    let components = server::build_components_from_env(config)?;

    if stream {
        let workflow = components.orchestrator.run_streaming(query);
        let mut events = Box::pin(event_stream(query, workflow));
        while let Some(event) = events.next().await {
            println!("{}", event.to_json()?);
        }
        return Ok(());
    }

    match components.orchestrator.run_batch(query).await {
        BatchOutcome::Completed(state) => {
            println!("{}", state.final_answer());
            Ok(())
        }
        BatchOutcome::Failed { error, .. } => bail!("Workflow failed: {error}"),
    }
}

fn list_tools(config: &AppConfig) -> Result<()> {
    let llm = Arc::new(OfflineProvider::new("listing tools"));
    let components = server::build_components(config, llm, None)?;

    for definition in components.registry.definitions() {
        println!(
            "{:<20} {:<10} {}",
            definition.name,
            definition.category.as_str(),
            definition.description
        );
    }
    Ok(())
}
