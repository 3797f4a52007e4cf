//! Strata Core - hierarchical agent pipeline
//!
//! This crate runs a query through four stages:
//! - Strategy: decide on an approach (or recognise small talk)
//! - Planning: turn the approach into tool tasks with dependency edges
//! - Execution: run the tasks in declared order against the tool registry
//! - Synthesis: aggregate task output and compose the final answer
//!
//! The orchestrator exposes a batch mode and a pull-driven streaming mode;
//! `stream` turns the streamed messages into wire events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod parse;
pub mod runner;
pub mod stage;
pub mod stream;
pub mod types;
pub mod util;

pub use agents::{AgentConfig, PlanningAgent, StrategyAgent};
pub use error::{Error, Result};
pub use executor::{TaskExecutor, DIRECT_LLM_TOOL, FALLBACK_TOOL};
pub use orchestrator::{BatchOutcome, WorkflowConfig, WorkflowOrchestrator, WorkflowStream};
pub use parse::ParseOutcome;
pub use runner::PlanRunner;
pub use stage::{PlanningStage, StrategyStage};
pub use stream::{event_stream, EventType, StreamEvent, StreamFormatter};
pub use types::{
    AggregatedResults, FinalResponse, FinalStatus, MessageKind, Plan, Strategy, Task, TaskResult,
    TaskStatus, WorkflowMessage, WorkflowState,
};
