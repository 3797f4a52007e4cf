//! Strata LLM - text completion for the agent pipeline
//!
//! This crate provides the language-model boundary used by the strategy and
//! planning stages:
//! - `LlmProvider`: provider trait (prompt messages in, free text out)
//! - `OpenAiProvider`: OpenAI-compatible chat completions over HTTP
//! - `OfflineProvider`: installed when no API key is configured
//! - `MockProvider`: scripted replies for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod offline;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use offline::OfflineProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;
