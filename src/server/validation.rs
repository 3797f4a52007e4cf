//! Production configuration validation
//!
//! Risky settings are reported as warnings; startup never fails here.

use super::config::AppConfig;
use tracing::warn;

/// Collect warnings for settings that are unsafe in production
pub fn production_warnings(config: &AppConfig, has_api_key: bool) -> Vec<String> {
    if !config.is_production() {
        return Vec::new();
    }

    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 behind a reverse proxy."
                .to_string(),
        );
    }

    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push(
            "CORS allows any origin in production. Set [server] cors_origins.".to_string(),
        );
    }

    if !has_api_key {
        warnings.push(
            "OPENAI_API_KEY is not set. Every stage will answer from its fallback.".to_string(),
        );
    }

    warnings
}

/// Log production warnings for `config`
pub fn validate_production_config(config: &AppConfig) {
    let has_api_key = std::env::var("OPENAI_API_KEY")
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    for warning in production_warnings(config, has_api_key) {
        warn!("SECURITY WARNING: {}", warning);
    }
}
