//! Strata Tools - tool registry and built-in content tools
//!
//! This crate provides the capabilities the execution stage runs tasks against:
//! - Registry: name to capability mapping, built once and read-only afterwards
//! - Builtins: `web_search`, `document_analyzer`, `data_extractor`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;

pub use builtins::{register_builtins, register_builtins_with_config, BuiltinsConfig};
pub use error::{Error, Result};
pub use registry::{Tool, ToolCategory, ToolDefinition, ToolRegistry};
