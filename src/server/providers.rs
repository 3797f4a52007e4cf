//! LLM provider resolution

use super::config::LlmConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use strata_llm::{LlmProvider, OfflineProvider, OpenAiConfig, OpenAiProvider};
use tracing::{info, warn};

/// Resolve the completion provider.
///
/// Uses OpenAI (or a compatible endpoint) when `OPENAI_API_KEY` is set and
/// an offline provider otherwise, so the pipeline still answers from its
/// fallbacks.
pub fn resolve_llm_provider(llm_config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    match OpenAiConfig::from_env() {
        Ok(config) => {
            let provider = OpenAiProvider::new(configure(config, llm_config))
                .context("Failed to create OpenAI provider")?;
            info!(model = %llm_config.model, "Registered OpenAI provider");
            Ok(Arc::new(provider))
        }
        Err(e) => {
            warn!(error = %e, "No LLM provider configured, running on fallbacks");
            Ok(Arc::new(OfflineProvider::new(e.to_string())))
        }
    }
}

fn configure(config: OpenAiConfig, llm_config: &LlmConfig) -> OpenAiConfig {
    let config = config.with_timeout(Duration::from_secs(llm_config.timeout_secs));
    match &llm_config.base_url {
        Some(base_url) if std::env::var("OPENAI_BASE_URL").is_err() => {
            config.with_base_url(base_url.clone())
        }
        _ => config,
    }
}
