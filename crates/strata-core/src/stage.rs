//! Stage collaborator seams
//!
//! The orchestrator drives strategy and planning through these traits. The
//! LLM-backed agents recover their own failures and always return `Ok`; an
//! `Err` here ends the workflow.

use crate::error::Result;
use crate::types::{AggregatedResults, FinalResponse, Plan, Strategy, TaskResult};

/// Strategy collaborator: decides the approach and composes the final answer
#[async_trait::async_trait]
pub trait StrategyStage: Send + Sync {
    /// Decide how to answer `query`
    async fn analyze(&self, query: &str) -> Result<Strategy>;

    /// Compose the final answer from aggregated results
    async fn synthesize(&self, aggregated: &AggregatedResults) -> Result<FinalResponse>;
}

/// Planning collaborator: builds task plans and aggregates their results
#[async_trait::async_trait]
pub trait PlanningStage: Send + Sync {
    /// Turn a strategy into a plan
    async fn create_plan(&self, strategy: &Strategy) -> Result<Plan>;

    /// Summarize execution results for `query`
    async fn aggregate(&self, query: &str, results: &[TaskResult]) -> Result<AggregatedResults>;
}
