//! Builtins - the content tools tasks are executed against
//!
//! - `web_search`: Tavily when an API key is configured, DuckDuckGo HTML otherwise
//! - `document_analyzer`: fetch a page and extract title, description and main text
//! - `data_extractor`: regex extraction of emails, URLs, phone numbers and dates

mod data_extractor;
mod document_analyzer;
mod html;
mod web_search;

pub use data_extractor::DataExtractorTool;
pub use document_analyzer::{DocumentAnalyzerConfig, DocumentAnalyzerTool};
pub use web_search::{WebSearchConfig, WebSearchTool};

use crate::error::Result;
use crate::registry::ToolRegistry;
use std::sync::Arc;

/// Configuration for built-in tools
#[derive(Debug, Clone, Default)]
pub struct BuiltinsConfig {
    /// Web search settings
    pub search: WebSearchConfig,
    /// Document analyzer settings
    pub document: DocumentAnalyzerConfig,
}

/// Register all built-in tools with the registry (default config)
pub fn register_builtins(registry: &mut ToolRegistry) -> Result<()> {
    register_builtins_with_config(registry, &BuiltinsConfig::default())
}

/// Register all built-in tools with custom configuration
pub fn register_builtins_with_config(
    registry: &mut ToolRegistry,
    config: &BuiltinsConfig,
) -> Result<()> {
    registry.register(Arc::new(WebSearchTool::new(config.search.clone())?));
    registry.register(Arc::new(DocumentAnalyzerTool::new(config.document.clone())?));
    registry.register(Arc::new(DataExtractorTool::new()));
    Ok(())
}
