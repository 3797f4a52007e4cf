//! Health check endpoint
//!
//! `/health` reports service identity, the pipeline agents and the
//! registered tools.

use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use strata_core::WorkflowOrchestrator;

/// Pipeline agents reported by `/health`
pub const AGENTS: [&str; 3] = ["strategy", "planning", "execution"];

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub agents: [&'static str; 3],
    pub tools: Vec<String>,
}

impl HealthResponse {
    fn healthy(tools: Vec<String>) -> Self {
        Self {
            status: "healthy",
            service: "strata",
            version: env!("CARGO_PKG_VERSION"),
            agents: AGENTS,
            tools,
        }
    }
}

async fn health_check(
    Extension(orchestrator): Extension<WorkflowOrchestrator>,
) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(orchestrator.tool_names()))
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let resp = HealthResponse::healthy(vec!["web_search".to_string()]);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "strata");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(
            json["agents"],
            serde_json::json!(["strategy", "planning", "execution"])
        );
        assert_eq!(json["tools"], serde_json::json!(["web_search"]));
    }
}
