//! Configuration API endpoint
//!
//! GET /api/config - Current pipeline settings

use axum::{routing::get, Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::server::config::AppConfig;

/// User-facing configuration view (excludes secrets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfigView {
    /// Model requested from the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Iteration ceiling reported in workflow state
    pub max_iterations: u32,
    /// Whether `/api/chat/stream` is served
    pub stream_enabled: bool,
    /// Deployment environment
    pub environment: String,
}

impl From<&AppConfig> for AppConfigView {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_iterations: config.agents.max_iterations,
            stream_enabled: config.agents.stream_enabled,
            environment: config.environment.clone(),
        }
    }
}

async fn get_config(Extension(view): Extension<AppConfigView>) -> Json<AppConfigView> {
    Json(view)
}

/// Create config routes
pub fn config_routes() -> Router {
    Router::new().route("/api/config", get(get_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_config() {
        let mut config = AppConfig::default();
        config.environment = "staging".to_string();
        config.agents.stream_enabled = false;

        let view = AppConfigView::from(&config);
        assert_eq!(view.model, "gpt-4-turbo-preview");
        assert_eq!(view.max_iterations, 10);
        assert!(!view.stream_enabled);
        assert_eq!(view.environment, "staging");
    }

    #[test]
    fn test_view_has_no_secrets() {
        let json = serde_json::to_value(AppConfigView::from(&AppConfig::default())).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys.len(),
            5,
            "unexpected fields in config view: {keys:?}"
        );
        assert!(json.get("api_key").is_none());
    }
}
