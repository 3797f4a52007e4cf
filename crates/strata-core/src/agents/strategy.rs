//! Strategy agent

use super::prompts::{strategy_user_prompt, STRATEGY_SYSTEM_PROMPT};
use super::{ask, AgentConfig};
use crate::error::Result;
use crate::parse::{parse_strategy, ParseOutcome};
use crate::stage::StrategyStage;
use crate::types::{AggregatedResults, FinalResponse, Strategy};
use crate::util::{truncate_chars, value_to_text};
use serde_json::Value;
use std::sync::Arc;
use strata_llm::LlmProvider;
use tracing::{error, info, instrument, warn};

/// Phrases that mark a query as small talk
const CONVERSATIONAL_PHRASES: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "how do you do",
    "what's up",
    "thanks",
    "thank you",
    "bye",
    "goodbye",
    "see you",
    "later",
    "ok",
    "okay",
    "yes",
    "no",
    "sure",
    "of course",
    "maybe",
    "please",
    "help",
    "sorry",
    "excuse me",
    "pardon",
];

/// Characters of a prose reply kept as the approach
const PROSE_APPROACH_CHARS: usize = 500;

/// Search items considered per task result
const ITEMS_PER_RESULT: usize = 3;

/// Snippets combined into the answer
const SNIPPETS_COMBINED: usize = 3;

/// Minimum trimmed snippet length worth quoting
const MIN_SNIPPET_CHARS: usize = 50;

/// Characters kept per snippet
const SNIPPET_CHARS: usize = 300;

/// Characters of combined snippets kept in the answer
const ANSWER_CHARS: usize = 400;

const NO_RESULTS_ANSWER: &str =
    "I wasn't able to find any information for your query. Please try rephrasing your question.";

const NO_CONTENT_ANSWER: &str = "I performed a web search but couldn't extract meaningful information from the results. This might be due to the search terms or content filtering.";

const SYNTHESIS_ERROR_ANSWER: &str = "Sorry, I encountered an error while processing your request.";

/// Whether `query` is small talk that skips research entirely.
///
/// True when the query has at most three words and contains a
/// conversational phrase, equals one exactly, or is shorter than ten
/// characters without a question mark.
#[must_use]
pub fn is_conversational(query: &str) -> bool {
    let trimmed = query.trim();
    let lower = trimmed.to_lowercase();
    let word_count = query.split_whitespace().count();

    (word_count <= 3 && CONVERSATIONAL_PHRASES.iter().any(|p| lower.contains(p)))
        || CONVERSATIONAL_PHRASES.contains(&lower.as_str())
        || (trimmed.chars().count() < 10 && !query.contains('?'))
}

/// Decides the approach for a query and composes the final answer
pub struct StrategyAgent {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl StrategyAgent {
    /// Create a strategy agent
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Analyze `query`. Small talk never reaches the LLM; LLM failures
    /// produce the fixed fallback strategy.
    #[instrument(skip(self), fields(provider = %self.llm.name()))]
    pub async fn analyze_query(&self, query: &str) -> Strategy {
        if is_conversational(query) {
            info!("Detected conversational query");
            return Strategy::conversational(query);
        }

        match ask(
            &self.llm,
            &self.config,
            STRATEGY_SYSTEM_PROMPT,
            strategy_user_prompt(query),
        )
        .await
        {
            Ok(reply) => {
                let strategy = match parse_strategy(query, &reply) {
                    ParseOutcome::Parsed(strategy) => strategy,
                    ParseOutcome::Malformed => {
                        Strategy::from_prose(query, truncate_chars(&reply, PROSE_APPROACH_CHARS))
                    }
                    ParseOutcome::Incomplete(key) => {
                        warn!(missing = key, "Strategy reply incomplete, using fallback");
                        Strategy::fallback(query, format!("missing {key}"))
                    }
                };
                info!(approach = %truncate_chars(&strategy.approach, 100), "Strategy determined");
                strategy
            }
            Err(e) => {
                error!(error = %e, "Strategy analysis failed, using fallback");
                Strategy::fallback(query, e.to_string())
            }
        }
    }

    /// Compose the final answer from aggregated results.
    #[must_use]
    pub fn compose_answer(&self, aggregated: &AggregatedResults) -> FinalResponse {
        compose_answer(aggregated)
    }
}

fn compose_answer(aggregated: &AggregatedResults) -> FinalResponse {
    let results = &aggregated.execution_results;

    if aggregated.is_conversational() {
        if let Some(first) = results.first() {
            return match &first.result {
                Value::Null => FinalResponse::failed(
                    SYNTHESIS_ERROR_ANSWER,
                    first
                        .error
                        .clone()
                        .unwrap_or_else(|| "conversational reply missing".to_string()),
                ),
                reply => FinalResponse::completed(value_to_text(reply), true),
            };
        }
    }

    if results.is_empty() {
        return FinalResponse::completed(NO_RESULTS_ANSWER, false);
    }

    let snippets: Vec<String> = results
        .iter()
        .filter_map(|r| r.result.as_array())
        .flat_map(|items| items.iter().take(ITEMS_PER_RESULT))
        .filter_map(|item| item.get("content").and_then(Value::as_str))
        .map(str::trim)
        .filter(|content| content.chars().count() > MIN_SNIPPET_CHARS)
        .map(|content| truncate_chars(content, SNIPPET_CHARS))
        .take(SNIPPETS_COMBINED)
        .collect();

    if snippets.is_empty() {
        return FinalResponse::completed(NO_CONTENT_ANSWER, false);
    }

    let combined = truncate_chars(&snippets.join(" "), ANSWER_CHARS);
    FinalResponse::completed(
        format!("{}{combined}...", answer_prefix(&aggregated.query)),
        false,
    )
}

fn answer_prefix(query: &str) -> &'static str {
    let lower = query.to_lowercase();
    if query.to_uppercase().contains("AI") || lower.contains("artificial intelligence") {
        "Based on current information about AI: "
    } else if lower.contains("latest") || lower.contains("recent") {
        "Recent developments show: "
    } else {
        "Here's what I found: "
    }
}

#[async_trait::async_trait]
impl StrategyStage for StrategyAgent {
    async fn analyze(&self, query: &str) -> Result<Strategy> {
        Ok(self.analyze_query(query).await)
    }

    async fn synthesize(&self, aggregated: &AggregatedResults) -> Result<FinalResponse> {
        Ok(self.compose_answer(aggregated))
    }
}
