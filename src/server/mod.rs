//! Server module for Strata
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `providers`: LLM provider resolution
//! - `validation`: Production configuration validation
//! - `init`: Component wiring, router and run loop

pub mod config;
mod init;
mod loader;
mod providers;
mod validation;

pub use init::{build_components, build_components_from_env, build_router, run, AppComponents};
pub use loader::load_config;
pub use providers::resolve_llm_provider;
