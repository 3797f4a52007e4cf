//! Orchestrator core structure and stage state machine

use crate::error::{Error, Result};
use crate::runner::PlanRunner;
use crate::stage::{PlanningStage, StrategyStage};
use crate::types::{AggregatedResults, MessageKind, WorkflowMessage, WorkflowState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::config::WorkflowConfig;
use super::streaming::WorkflowStream;

/// Position in the stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Strategy,
    Planning,
    Execution,
    Aggregation,
    Synthesis,
    Done,
    Failed,
}

/// One query's progress through the stages
pub(crate) struct WorkflowRun {
    pub(crate) state: WorkflowState,
    pub(crate) phase: Phase,
    aggregated: Option<AggregatedResults>,
}

impl WorkflowRun {
    pub(crate) fn new(query: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            state: WorkflowState::new(query, max_iterations),
            phase: Phase::Strategy,
            aggregated: None,
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    /// Every stage ran
    Completed(WorkflowState),
    /// A stage failed; the run stopped there
    Failed {
        /// Failure description
        error: String,
        /// The query
        query: String,
    },
}

impl BatchOutcome {
    /// Whether every stage ran
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Final state of a completed run
    #[must_use]
    pub fn state(&self) -> Option<&WorkflowState> {
        match self {
            Self::Completed(state) => Some(state),
            Self::Failed { .. } => None,
        }
    }
}

/// Runs queries through strategy, planning, execution and synthesis
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    pub(crate) strategy: Arc<dyn StrategyStage>,
    pub(crate) planning: Arc<dyn PlanningStage>,
    pub(crate) runner: PlanRunner,
    pub(crate) config: WorkflowConfig,
}

impl WorkflowOrchestrator {
    /// Create a new orchestrator
    #[must_use]
    pub fn new(
        strategy: Arc<dyn StrategyStage>,
        planning: Arc<dyn PlanningStage>,
        runner: PlanRunner,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            strategy,
            planning,
            runner,
            config,
        }
    }

    /// Orchestrator configuration
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Names of the tools plans can use
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        self.runner.executor().registry().names()
    }

    /// Run every stage and return the accumulated state, or the first error.
    pub async fn run_batch(&self, query: &str) -> BatchOutcome {
        let span = info_span!("workflow", run_id = %Uuid::new_v4(), mode = "batch");
        async {
            let mut run = WorkflowRun::new(query, self.config.max_iterations);
            loop {
                match self.step(&mut run).await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        info!("Workflow completed");
                        return BatchOutcome::Completed(run.state);
                    }
                    Err(e) => {
                        return BatchOutcome::Failed {
                            error: e.to_string(),
                            query: query.to_string(),
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Start a lazily evaluated run; each pull computes one stage.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn run_streaming(&self, query: impl Into<String>) -> WorkflowStream {
        WorkflowStream::spawn(self.clone(), query.into())
    }

    /// Run the current stage, append its message and advance.
    ///
    /// Returns `Ok(None)` once the run is finished. An error moves the run
    /// to the failed state, after which it only returns `Ok(None)`.
    pub(crate) async fn step(&self, run: &mut WorkflowRun) -> Result<Option<WorkflowMessage>> {
        let outcome = self.advance(run).await;
        match &outcome {
            Ok(Some(message)) => {
                debug!(kind = message.kind.as_str(), "Stage complete");
                run.state.messages.push(message.clone());
            }
            Ok(None) => {}
            Err(e) => {
                error!(phase = ?run.phase, error = %e, "Workflow failed");
                run.phase = Phase::Failed;
            }
        }
        outcome
    }

    async fn advance(&self, run: &mut WorkflowRun) -> Result<Option<WorkflowMessage>> {
        let message = match run.phase {
            Phase::Strategy => {
                let strategy = self.strategy.analyze(&run.state.query).await?;
                let message = stage_message("strategy", MessageKind::StrategyComplete, &strategy)?;
                run.state.strategy = Some(strategy);
                run.phase = Phase::Planning;
                message
            }
            Phase::Planning => {
                let strategy = run
                    .state
                    .strategy
                    .as_ref()
                    .ok_or_else(|| Error::Internal("planning without a strategy".to_string()))?;
                let plan = self.planning.create_plan(strategy).await?;
                let message = stage_message("planning", MessageKind::PlanCreated, &plan)?;
                run.state.plan = Some(plan);
                run.phase = Phase::Execution;
                message
            }
            Phase::Execution => {
                let plan = run
                    .state
                    .plan
                    .as_ref()
                    .ok_or_else(|| Error::Internal("execution without a plan".to_string()))?;
                let results = self.runner.run(plan).await;
                let message = WorkflowMessage::new(
                    "execution",
                    MessageKind::ExecutionComplete,
                    serde_json::json!({ "results": serde_json::to_value(&results)? }),
                );
                run.state.execution_results = results;
                run.phase = Phase::Aggregation;
                message
            }
            Phase::Aggregation => {
                let aggregated = self
                    .planning
                    .aggregate(&run.state.query, &run.state.execution_results)
                    .await?;
                let message =
                    stage_message("planning", MessageKind::AggregationComplete, &aggregated)?;
                run.aggregated = Some(aggregated);
                run.phase = Phase::Synthesis;
                message
            }
            Phase::Synthesis => {
                let aggregated = run
                    .aggregated
                    .as_ref()
                    .ok_or_else(|| Error::Internal("synthesis without aggregation".to_string()))?;
                let response = self.strategy.synthesize(aggregated).await?;
                let message =
                    stage_message("strategy", MessageKind::SynthesisComplete, &response)?;
                run.state.final_response = Some(response);
                run.phase = Phase::Done;
                message
            }
            Phase::Done | Phase::Failed => return Ok(None),
        };
        Ok(Some(message))
    }
}

fn stage_message<T: Serialize>(
    agent: &str,
    kind: MessageKind,
    payload: &T,
) -> Result<WorkflowMessage> {
    Ok(WorkflowMessage::new(agent, kind, serde_json::to_value(payload)?))
}
