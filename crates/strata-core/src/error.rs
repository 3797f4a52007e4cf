//! Error types for strata-core
//!
//! Collaborator and tool failures are normally recovered where they happen;
//! whatever reaches this type ends the workflow with a single error message.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] strata_llm::Error),

    /// Tool error
    #[error("tool error: {0}")]
    Tool(#[from] strata_tools::Error),

    /// A pipeline stage failed
    #[error("{stage} stage failed: {message}")]
    Stage {
        /// Stage name
        stage: &'static str,
        /// Failure description
        message: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stage failure helper
    #[must_use]
    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
