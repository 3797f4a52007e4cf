//! Data extractor - pull structured fields out of free text with regexes
//!
//! Input is plain text. Prefixing it with a category name and a colon
//! (`"email: ..."`) restricts extraction to that category.

use crate::error::Result;
use crate::registry::{Tool, ToolCategory, ToolDefinition};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

/// Extraction categories in reporting order.
pub const CATEGORIES: &[&str] = &["email", "url", "phone", "date"];

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "email",
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("email regex"),
        ),
        (
            "url",
            Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("url regex"),
        ),
        (
            "phone",
            Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone regex"),
        ),
        (
            "date",
            Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("date regex"),
        ),
    ]
});

/// Regex-based field extraction tool.
pub struct DataExtractorTool {
    definition: ToolDefinition,
}

impl DataExtractorTool {
    /// Create a new data extractor
    #[must_use]
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            "data_extractor",
            "Extract emails, URLs, phone numbers and dates from text. \
             Prefix the text with 'email:', 'url:', 'phone:' or 'date:' to extract one kind only.",
        )
        .with_category(ToolCategory::Utility);

        Self { definition }
    }
}

impl Default for DataExtractorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for DataExtractorTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: &str) -> Result<Value> {
        Ok(match split_category(input) {
            Some((category, text)) => extract_one(category, text),
            None => extract_all(input),
        })
    }
}

/// Split a leading `category:` selector off the input.
fn split_category(input: &str) -> Option<(&'static str, &str)> {
    let (head, rest) = input.split_once(':')?;
    let head = head.trim().to_lowercase();
    CATEGORIES
        .iter()
        .find(|c| **c == head)
        .map(|c| (*c, rest.trim_start()))
}

fn find_matches(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn extract_one(category: &str, text: &str) -> Value {
    let matches = PATTERNS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, re)| find_matches(re, text))
        .unwrap_or_default();

    json!({
        "type": category,
        "count": matches.len(),
        "matches": matches,
    })
}

fn extract_all(text: &str) -> Value {
    let mut extracted = Map::new();
    for (name, re) in PATTERNS.iter() {
        let matches = find_matches(re, text);
        if !matches.is_empty() {
            extracted.insert(
                (*name).to_string(),
                json!({ "count": matches.len(), "matches": matches }),
            );
        }
    }

    json!({
        "text_length": text.chars().count(),
        "extracted": extracted,
    })
}
