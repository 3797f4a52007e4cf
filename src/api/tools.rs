//! Tools API endpoint
//!
//! GET /api/tools - List registered tools

use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use strata_tools::{ToolDefinition, ToolRegistry};

/// Tool information for API response
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool name (identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Tool category
    pub category: String,
}

impl From<&ToolDefinition> for ToolInfo {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            category: definition.category.as_str().to_string(),
        }
    }
}

/// Tools listing
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}

async fn list_tools(Extension(registry): Extension<Arc<ToolRegistry>>) -> Json<ToolsResponse> {
    let tools = registry.definitions().into_iter().map(ToolInfo::from).collect();
    Json(ToolsResponse { tools })
}

/// Create tools routes
pub fn tools_routes() -> Router {
    Router::new().route("/api/tools", get(list_tools))
}
