//! Server configuration types
//!
//! Deserialized from the layered sources in `loader`. Every field has a
//! default so partial override files are accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strata_core::{AgentConfig, WorkflowConfig};
use strata_tools::builtins::{DocumentAnalyzerConfig, WebSearchConfig};
use strata_tools::BuiltinsConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name ("development", "production", ...)
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            agents: AgentsConfig::default(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Model settings for the strategy and planning agents
    pub fn agent_config(&self) -> AgentConfig {
        let config = AgentConfig::new()
            .with_model(self.llm.model.clone())
            .with_temperature(self.llm.temperature);
        match self.llm.max_tokens {
            Some(max) => config.with_max_tokens(max),
            None => config,
        }
    }

    /// Orchestrator settings
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig::new().with_max_iterations(self.agents.max_iterations)
    }

    /// Built-in tool settings; `tavily_api_key` selects the search backend
    pub fn builtins_config(&self, tavily_api_key: Option<String>) -> BuiltinsConfig {
        BuiltinsConfig {
            search: WebSearchConfig {
                tavily_api_key: tavily_api_key.filter(|k| !k.trim().is_empty()),
                max_results: self.tools.search_max_results,
                ..WebSearchConfig::default()
            },
            document: DocumentAnalyzerConfig {
                timeout: Duration::from_secs(self.tools.document_timeout_secs),
                ..DocumentAnalyzerConfig::default()
            },
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; `"*"` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Language model settings (the API key comes from `OPENAI_API_KEY`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Used when `OPENAI_BASE_URL` is not set
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout_secs(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    strata_llm::openai::DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    strata_core::agents::DEFAULT_TEMPERATURE
}
fn default_llm_timeout_secs() -> u64 {
    60
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Serve `/api/chat/stream`
    #[serde(default = "default_true")]
    pub stream_enabled: bool,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            stream_enabled: true,
        }
    }
}

fn default_max_iterations() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

/// Built-in tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
    #[serde(default = "default_document_timeout_secs")]
    pub document_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_max_results: default_search_max_results(),
            document_timeout_secs: default_document_timeout_secs(),
        }
    }
}

fn default_search_max_results() -> usize {
    5
}
fn default_document_timeout_secs() -> u64 {
    10
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.agents.max_iterations, 10);
        assert!(config.agents.stream_enabled);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.is_production());
    }

    #[test]
    fn test_agent_config_carries_llm_settings() {
        let mut config = AppConfig::default();
        config.llm.model = "gpt-4o-mini".to_string();
        config.llm.max_tokens = Some(512);

        let agent = config.agent_config();
        assert_eq!(agent.model, "gpt-4o-mini");
        assert_eq!(agent.max_tokens, Some(512));
    }

    #[test]
    fn test_builtins_config() {
        let mut config = AppConfig::default();
        config.tools.search_max_results = 3;
        config.tools.document_timeout_secs = 4;

        let builtins = config.builtins_config(Some("  ".to_string()));
        assert!(builtins.search.tavily_api_key.is_none());
        assert_eq!(builtins.search.max_results, 3);
        assert_eq!(builtins.document.timeout, Duration::from_secs(4));

        let builtins = config.builtins_config(Some("tvly-key".to_string()));
        assert_eq!(builtins.search.tavily_api_key.as_deref(), Some("tvly-key"));
    }

    #[test]
    fn test_log_format_parsing() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(logging.format, LogFormat::Json);
    }
}
