//! LLM-backed stage collaborators
//!
//! - `StrategyAgent`: small-talk detection, strategy analysis, final synthesis
//! - `PlanningAgent`: plan creation and result aggregation

mod config;
mod planning;
mod prompts;
mod strategy;

pub use config::{AgentConfig, DEFAULT_TEMPERATURE};
pub use planning::PlanningAgent;
pub use strategy::{is_conversational, StrategyAgent};

use std::sync::Arc;
use strata_llm::{CompletionRequest, LlmProvider, Message};

/// Send a system + user prompt pair and return the reply text.
pub(crate) async fn ask(
    llm: &Arc<dyn LlmProvider>,
    config: &AgentConfig,
    system: &str,
    user: String,
) -> strata_llm::Result<String> {
    let mut request = CompletionRequest::new(config.model.clone())
        .with_message(Message::system(system))
        .with_message(Message::user(user))
        .with_temperature(config.temperature);
    if let Some(max_tokens) = config.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    Ok(llm.complete(request).await?.content)
}
