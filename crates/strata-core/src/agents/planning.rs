//! Planning agent

use super::prompts::{
    aggregation_user_prompt, planning_user_prompt, AGGREGATION_SYSTEM_PROMPT,
    PLANNING_SYSTEM_PROMPT,
};
use super::{ask, AgentConfig};
use crate::error::{Error, Result};
use crate::executor::{DIRECT_LLM_TOOL, FALLBACK_TOOL};
use crate::parse::parse_plan;
use crate::stage::PlanningStage;
use crate::types::{AggregatedResults, Plan, Strategy, Task, TaskResult};
use crate::util::truncate_chars;
use std::sync::Arc;
use strata_llm::LlmProvider;
use tracing::{error, info, instrument, warn};

/// Id of the single task in a conversational plan
pub const CONVERSATIONAL_TASK_ID: &str = "conversational_response";

/// Tasks in a fallback plan
const MAX_FALLBACK_TASKS: usize = 3;

/// Characters of serialized results sent for aggregation
const MAX_RESULTS_PROMPT_CHARS: usize = 12_000;

/// Summary used when aggregation fails
const FALLBACK_SUMMARY: &str = "Results aggregated";

/// Builds task plans and aggregates their results
pub struct PlanningAgent {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl PlanningAgent {
    /// Create a planning agent
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Plan for `strategy`. Conversational strategies never reach the LLM;
    /// malformed replies, LLM failures and serialization failures produce
    /// the fallback plan.
    #[instrument(skip(self, strategy), fields(provider = %self.llm.name()))]
    pub async fn plan(&self, strategy: &Strategy) -> Plan {
        if strategy.is_conversational {
            info!("Conversational strategy, planning a direct reply");
            return conversational_plan(strategy);
        }

        let plan = match self.request_plan(strategy).await {
            Ok(reply) => parse_plan(&reply).or_fallback(|| {
                warn!("Plan reply was not usable, using fallback plan");
                fallback_plan(strategy)
            }),
            Err(e) => {
                error!(error = %e, "Planning failed, using fallback plan");
                fallback_plan(strategy)
            }
        };

        let plan = plan.with_strategy_ref(strategy.approach.clone());
        info!(tasks = plan.tasks.len(), "Plan created");
        plan
    }

    /// Summarize `results`; LLM and serialization failures produce the
    /// fixed summary.
    #[instrument(skip(self, results), fields(results = results.len()))]
    pub async fn summarize(&self, query: &str, results: &[TaskResult]) -> AggregatedResults {
        match self.request_summary(query, results).await {
            Ok(summary) => AggregatedResults::new(query, summary, results.to_vec()),
            Err(e) => fallback_aggregation(query, results, &e),
        }
    }

    async fn request_plan(&self, strategy: &Strategy) -> Result<String> {
        let strategy_json = serde_json::to_string_pretty(strategy)?;
        Ok(ask(
            &self.llm,
            &self.config,
            PLANNING_SYSTEM_PROMPT,
            planning_user_prompt(&strategy_json, &strategy.query),
        )
        .await?)
    }

    async fn request_summary(&self, query: &str, results: &[TaskResult]) -> Result<String> {
        let results_json = serde_json::to_string(results)?;
        Ok(ask(
            &self.llm,
            &self.config,
            AGGREGATION_SYSTEM_PROMPT,
            aggregation_user_prompt(query, &truncate_chars(&results_json, MAX_RESULTS_PROMPT_CHARS)),
        )
        .await?)
    }
}

fn fallback_aggregation(query: &str, results: &[TaskResult], e: &Error) -> AggregatedResults {
    error!(error = %e, "Aggregation failed");
    AggregatedResults::new(query, FALLBACK_SUMMARY, results.to_vec()).with_error(e.to_string())
}

/// Single `direct_llm` task answering the query itself
fn conversational_plan(strategy: &Strategy) -> Plan {
    let task = Task::new(
        CONVERSATIONAL_TASK_ID,
        "Generate friendly conversational response",
        DIRECT_LLM_TOOL,
        strategy.query.clone(),
    );
    let mut plan = Plan::new(vec![task], vec![CONVERSATIONAL_TASK_ID.to_string()])
        .with_strategy_ref(strategy.approach.clone());
    plan.is_conversational = true;
    plan
}

/// Up to three independent searches for the query, one per subtask
fn fallback_plan(strategy: &Strategy) -> Plan {
    let input = if strategy.query.trim().is_empty() {
        "general information".to_string()
    } else {
        strategy.query.clone()
    };

    let default_subtasks = ["Search for information".to_string()];
    let subtasks: &[String] = if strategy.subtasks.is_empty() {
        &default_subtasks
    } else {
        &strategy.subtasks
    };

    let tasks: Vec<Task> = subtasks
        .iter()
        .take(MAX_FALLBACK_TASKS)
        .enumerate()
        .map(|(i, subtask)| {
            Task::new(format!("task_{}", i + 1), subtask.clone(), FALLBACK_TOOL, input.clone())
        })
        .collect();

    let order = tasks.iter().map(|t| t.task_id.clone()).collect();
    Plan::new(tasks, order)
}

#[async_trait::async_trait]
impl PlanningStage for PlanningAgent {
    async fn create_plan(&self, strategy: &Strategy) -> Result<Plan> {
        Ok(self.plan(strategy).await)
    }

    async fn aggregate(&self, query: &str, results: &[TaskResult]) -> Result<AggregatedResults> {
        Ok(self.summarize(query, results).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_llm::MockProvider;

    fn agent(mock: &MockProvider) -> PlanningAgent {
        PlanningAgent::new(Arc::new(mock.clone()), AgentConfig::default())
    }

    fn research_strategy(query: &str, subtasks: &[&str]) -> Strategy {
        let mut strategy = Strategy::from_prose(query, "Research it");
        strategy.subtasks = subtasks.iter().map(|s| (*s).to_string()).collect();
        strategy
    }

    #[tokio::test]
    async fn test_conversational_plan_skips_llm() {
        let mock = MockProvider::new();
        let plan = agent(&mock).plan(&Strategy::conversational("hello")).await;

        assert!(plan.is_conversational);
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].task_id, CONVERSATIONAL_TASK_ID);
        assert_eq!(plan.tasks[0].tool, DIRECT_LLM_TOOL);
        assert_eq!(plan.tasks[0].input, "hello");
        assert!(plan.tasks[0].dependencies.is_empty());
        assert_eq!(plan.execution_order, vec![CONVERSATIONAL_TASK_ID]);
        assert_eq!(plan.estimated_steps, 1);
        assert_eq!(plan.strategy_ref, "Direct conversational response");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_plan() {
        let mock = MockProvider::new();
        mock.add_response(
            r#"{"tasks": [
                {"task_id": "s", "description": "search", "tool": "web_search", "input": "rust"},
                {"task_id": "x", "description": "extract", "tool": "data_extractor",
                 "input": "text", "dependencies": ["s"]}
               ], "execution_order": ["s", "x"]}"#,
        );

        let plan = agent(&mock).plan(&research_strategy("rust", &["a"])).await;
        assert!(!plan.is_conversational);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.execution_order, vec!["s", "x"]);
        assert_eq!(plan.strategy_ref, "Research it");
        assert!(mock.requests()[0].messages[1].content.contains("Research it"));
    }

    #[tokio::test]
    async fn test_malformed_reply_uses_fallback() {
        let mock = MockProvider::new();
        mock.add_response(r#"{"steps": ["search"]}"#);

        let plan = agent(&mock)
            .plan(&research_strategy("rust news", &["One", "Two", "Three", "Four"]))
            .await;

        let ids: Vec<&str> = plan.tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, vec!["task_1", "task_2", "task_3"]);
        assert!(plan.tasks.iter().all(|t| t.tool == "web_search" && t.input == "rust news"));
        assert!(plan.tasks.iter().all(|t| t.dependencies.is_empty()));
        assert_eq!(plan.execution_order, vec!["task_1", "task_2", "task_3"]);
        assert_eq!(plan.tasks[1].description, "Two");
    }

    #[tokio::test]
    async fn test_llm_failure_uses_fallback() {
        let mock = MockProvider::new();
        mock.add_failure("offline");

        let plan = agent(&mock).plan(&research_strategy("  ", &[])).await;
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].description, "Search for information");
        assert_eq!(plan.tasks[0].input, "general information");
    }

    #[tokio::test]
    async fn test_summarize() {
        let mock = MockProvider::new();
        mock.add_response("Rust 1.80 shipped LazyLock.");
        let task = Task::new("t1", "", "web_search", "rust");
        let results = vec![TaskResult::success(&task, "web_search", json!([]))];

        let aggregated = agent(&mock).summarize("rust", &results).await;
        assert_eq!(aggregated.summary, "Rust 1.80 shipped LazyLock.");
        assert_eq!(aggregated.task_count, 1);
        assert_eq!(aggregated.query, "rust");
        assert_eq!(aggregated.stage, "aggregation");
        assert!(aggregated.error.is_none());
    }

    #[tokio::test]
    async fn test_summarize_failure() {
        let mock = MockProvider::new();
        mock.add_failure("rate limited");

        let aggregated = agent(&mock).summarize("rust", &[]).await;
        assert_eq!(aggregated.summary, FALLBACK_SUMMARY);
        assert_eq!(aggregated.error.as_deref(), Some("llm error: api error: rate limited"));
        assert_eq!(aggregated.task_count, 0);
    }

    #[test]
    fn test_serialization_failure_keeps_results() {
        let task = Task::new("t1", "", "web_search", "rust");
        let results = vec![TaskResult::success(&task, "web_search", json!([]))];
        let e: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();

        let aggregated = fallback_aggregation("rust", &results, &e);
        assert_eq!(aggregated.summary, FALLBACK_SUMMARY);
        assert_eq!(aggregated.execution_results, results);
        assert!(aggregated
            .error
            .as_deref()
            .unwrap_or("")
            .starts_with("serialization error:"));
    }
}
