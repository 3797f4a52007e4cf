//! Coercion of loosely structured LLM replies into pipeline records
//!
//! Replies are free text that usually contains one JSON object. The first
//! `{` through the last `}` is parsed. A reply with no JSON object is
//! `ParseOutcome::Malformed`; an object missing a required key is
//! `ParseOutcome::Incomplete`. The caller builds its fallback record
//! explicitly in both cases.

use crate::types::{Plan, Strategy, Task};
use crate::util::value_to_text;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::warn;

static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json object regex"));

/// Result of coercing a reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The reply had the required shape
    Parsed(T),
    /// The reply held no JSON object
    Malformed,
    /// The reply held a JSON object without the named required key
    Incomplete(&'static str),
}

impl<T> ParseOutcome<T> {
    /// Parsed value, or the fallback built by `fallback`
    pub fn or_fallback(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Parsed(value) => value,
            Self::Malformed | Self::Incomplete(_) => fallback(),
        }
    }

    /// Whether the reply parsed
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// The outermost `{...}` span of `text`, if it parses to a JSON object
#[must_use]
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let span = JSON_OBJECT_RE.find(text)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null => None,
        other => Some(value_to_text(other)),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(value_to_text)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Coerce a strategy reply. The object must carry an `approach`.
#[must_use]
pub fn parse_strategy(query: &str, text: &str) -> ParseOutcome<Strategy> {
    let Some(obj) = extract_json_object(text) else {
        return ParseOutcome::Malformed;
    };
    let Some(approach) = string_field(&obj, "approach") else {
        return ParseOutcome::Incomplete("approach");
    };

    ParseOutcome::Parsed(Strategy {
        approach,
        complexity: string_field(&obj, "complexity").unwrap_or_else(|| "moderate".to_string()),
        required_resources: string_list(obj.get("required_resources")),
        subtasks: string_list(obj.get("subtasks")),
        expected_output: string_field(&obj, "expected_output")
            .unwrap_or_else(|| "Comprehensive answer".to_string()),
        is_conversational: false,
        query: query.to_string(),
        agent: "strategy".to_string(),
        error: None,
    })
}

/// Task input may come back as a string or as an object carrying `query`/`input`.
fn task_input(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(obj)) => ["query", "input"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map_or_else(|| Value::Object(obj.clone()).to_string(), str::to_string),
        Some(other) => value_to_text(other),
        None => String::new(),
    }
}

fn parse_task(value: &Value) -> Option<Task> {
    let obj = value.as_object()?;
    let task_id = string_field(obj, "task_id").filter(|id| !id.is_empty())?;

    Some(Task {
        task_id,
        description: string_field(obj, "description").unwrap_or_default(),
        tool: string_field(obj, "tool").unwrap_or_else(|| "web_search".to_string()),
        input: task_input(obj.get("input")),
        dependencies: string_list(obj.get("dependencies")),
    })
}

/// Coerce a planning reply. The object must carry a `tasks` array.
#[must_use]
pub fn parse_plan(text: &str) -> ParseOutcome<Plan> {
    let Some(obj) = extract_json_object(text) else {
        return ParseOutcome::Malformed;
    };
    let Some(Value::Array(raw_tasks)) = obj.get("tasks") else {
        return ParseOutcome::Incomplete("tasks");
    };

    let tasks: Vec<Task> = raw_tasks
        .iter()
        .filter_map(|raw| {
            let task = parse_task(raw);
            if task.is_none() {
                warn!(task = %raw, "Dropping plan task without task_id");
            }
            task
        })
        .collect();

    let execution_order = string_list(obj.get("execution_order"));
    let mut plan = Plan::new(tasks, execution_order);
    if let Some(steps) = obj
        .get("estimated_steps")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
    {
        plan.estimated_steps = steps;
    }

    ParseOutcome::Parsed(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_from_prose() {
        let text = "Here is the plan:\n```json\n{\"a\": {\"b\": 1}}\n```\nDone.";
        let obj = extract_json_object(text).unwrap();
        assert_eq!(obj["a"]["b"], 1);
    }

    #[test]
    fn test_extract_json_object_rejects_garbage() {
        assert!(extract_json_object("no braces here").is_none());
        assert!(extract_json_object("{not json}").is_none());
    }

    #[test]
    fn test_parse_strategy() {
        let reply = r#"{"approach": "Search then summarize", "complexity": "complex",
            "required_resources": ["web_search"], "subtasks": ["Find", "Summarize"],
            "expected_output": "A summary"}"#;
        let ParseOutcome::Parsed(strategy) = parse_strategy("rust news", reply) else {
            panic!("expected parsed strategy");
        };
        assert_eq!(strategy.approach, "Search then summarize");
        assert_eq!(strategy.complexity, "complex");
        assert_eq!(strategy.subtasks, vec!["Find", "Summarize"]);
        assert_eq!(strategy.query, "rust news");
        assert!(!strategy.is_conversational);
    }

    #[test]
    fn test_parse_strategy_defaults_and_malformed() {
        let ParseOutcome::Parsed(strategy) = parse_strategy("q", r#"{"approach": "x"}"#) else {
            panic!("expected parsed strategy");
        };
        assert_eq!(strategy.complexity, "moderate");
        assert!(strategy.required_resources.is_empty());

        assert_eq!(parse_strategy("q", "just prose"), ParseOutcome::Malformed);
        assert_eq!(
            parse_strategy("q", r#"{"complexity": "simple"}"#),
            ParseOutcome::Incomplete("approach")
        );
    }

    #[test]
    fn test_parse_plan() {
        let reply = r#"Plan:
        {
          "tasks": [
            {"task_id": "task_1", "description": "Search", "tool": "web_search",
             "input": "rust 2024 edition", "dependencies": []},
            {"task_id": "task_2", "description": "Read", "tool": "document_analyzer",
             "input": {"query": "https://blog.rust-lang.org"}, "dependencies": ["task_1"]},
            {"description": "no id"}
          ],
          "execution_order": ["task_1", "task_2"],
          "estimated_steps": 2
        }"#;
        let plan = parse_plan(reply).or_fallback(|| panic!("expected parsed plan"));
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[1].input, "https://blog.rust-lang.org");
        assert_eq!(plan.tasks[1].dependencies, vec!["task_1"]);
        assert_eq!(plan.execution_order, vec!["task_1", "task_2"]);
        assert_eq!(plan.estimated_steps, 2);
    }

    #[test]
    fn test_parse_plan_coercions() {
        let reply = r#"{"tasks": [{"task_id": 7, "input": {"url": "x"}}]}"#;
        let plan = parse_plan(reply).or_fallback(|| panic!("expected parsed plan"));
        assert_eq!(plan.tasks[0].task_id, "7");
        assert_eq!(plan.tasks[0].tool, "web_search");
        assert_eq!(plan.tasks[0].input, r#"{"url":"x"}"#);
        assert!(plan.execution_order.is_empty());
    }

    #[test]
    fn test_parse_plan_requires_tasks() {
        assert_eq!(parse_plan(r#"{"steps": []}"#), ParseOutcome::Incomplete("tasks"));
        assert!(!parse_plan("nothing").is_parsed());
    }
}
