//! Server initialization and main run loop

use super::config::AppConfig;
use super::providers::resolve_llm_provider;
use super::validation::validate_production_config;
use crate::api::{api_router, AppConfigView};
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::{routing::get, Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use strata_core::{
    PlanRunner, PlanningAgent, StrategyAgent, TaskExecutor, WorkflowOrchestrator,
};
use strata_llm::LlmProvider;
use strata_tools::{register_builtins_with_config, ToolRegistry};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Components shared by the HTTP handlers and the CLI
#[derive(Clone)]
pub struct AppComponents {
    pub orchestrator: WorkflowOrchestrator,
    pub registry: Arc<ToolRegistry>,
}

/// Wire the registry, agents and orchestrator around `llm`
pub fn build_components(
    config: &AppConfig,
    llm: Arc<dyn LlmProvider>,
    tavily_api_key: Option<String>,
) -> Result<AppComponents> {
    let mut registry = ToolRegistry::new();
    register_builtins_with_config(&mut registry, &config.builtins_config(tavily_api_key))
        .context("Failed to register built-in tools")?;
    let registry = Arc::new(registry);
    info!(tools = ?registry.names(), "Tool registry initialized");

    let agent_config = config.agent_config();
    let strategy = Arc::new(StrategyAgent::new(llm.clone(), agent_config.clone()));
    let planning = Arc::new(PlanningAgent::new(llm, agent_config));
    let runner = PlanRunner::new(TaskExecutor::new(registry.clone()));

    let orchestrator =
        WorkflowOrchestrator::new(strategy, planning, runner, config.workflow_config());

    Ok(AppComponents {
        orchestrator,
        registry,
    })
}

/// Build components from environment secrets (`OPENAI_API_KEY`, `TAVILY_API_KEY`)
pub fn build_components_from_env(config: &AppConfig) -> Result<AppComponents> {
    let llm = resolve_llm_provider(&config.llm)?;
    info!(provider = llm.name(), "LLM provider initialized");
    build_components(config, llm, std::env::var("TAVILY_API_KEY").ok())
}

/// Build the HTTP router with shared components and layers
pub fn build_router(components: &AppComponents, config: &AppConfig) -> Router {
    api_router()
        .route("/", get(|| async { "Strata agent pipeline" }))
        .layer(Extension(components.orchestrator.clone()))
        .layer(Extension(components.registry.clone()))
        .layer(Extension(AppConfigView::from(config)))
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    info!(
        "Starting Strata v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    validate_production_config(&config);

    let components = build_components_from_env(&config)?;
    let app = build_router(&components, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Strata shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
