//! Orchestrator - sequences the four pipeline stages
//!
//! # Module Structure
//!
//! - `config`: `WorkflowConfig`
//! - `core`: `WorkflowOrchestrator`, the stage state machine and batch mode
//! - `streaming`: `WorkflowStream`, the pull-driven message feed
//!
//! Stages run strictly in order: strategy, planning, execution, aggregation,
//! synthesis. Each completed stage appends one message to the workflow log.
//! The first stage error ends the run; nothing is retried.

mod config;
mod core;
mod streaming;


pub use config::WorkflowConfig;
pub use core::{BatchOutcome, WorkflowOrchestrator};
pub use streaming::WorkflowStream;
