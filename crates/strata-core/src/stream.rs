//! Streaming wire events
//!
//! Converts workflow messages into the client-facing event envelope
//! `{type, agent, data, timestamp}` and frames it for Server-Sent Events.
//! A stream always opens with `start` and closes with `complete`.

use crate::error::Result;
use crate::orchestrator::WorkflowStream;
use crate::types::{MessageKind, WorkflowMessage};
use crate::util::truncate_chars;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Characters of the aggregation summary shown in the event
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Wire event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Workflow accepted
    Start,
    /// Strategy decided
    Strategy,
    /// Plan created
    Planning,
    /// Tasks executed
    Execution,
    /// Results aggregated
    Aggregation,
    /// Final answer ready
    Final,
    /// A stage failed
    Error,
    /// Stream finished
    Complete,
}

/// One client-facing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event type
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Originating agent; absent for `start` and `complete`
    pub agent: Option<String>,
    /// Event payload
    pub data: Value,
    /// RFC 3339 UTC time the event was formatted
    pub timestamp: String,
}

impl StreamEvent {
    /// Create an event stamped with the current time
    #[must_use]
    pub fn new(event_type: EventType, agent: Option<&str>, data: Value) -> Self {
        Self {
            event_type,
            agent: agent.map(str::to_string),
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Frame as an SSE record: `data: <json>` followed by a blank line
    pub fn to_sse(&self) -> Result<String> {
        Ok(format!("data: {}\n\n", self.to_json()?))
    }
}

/// Maps workflow messages to wire events
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamFormatter;

impl StreamFormatter {
    /// Opening event
    #[must_use]
    pub fn start(&self, query: &str) -> StreamEvent {
        StreamEvent::new(
            EventType::Start,
            None,
            json!({ "query": query, "message": "Starting agent workflow..." }),
        )
    }

    /// Event for one workflow message
    #[must_use]
    pub fn format(&self, message: &WorkflowMessage) -> StreamEvent {
        let data = &message.data;
        match message.kind {
            MessageKind::StrategyComplete => StreamEvent::new(
                EventType::Strategy,
                Some("strategy"),
                json!({
                    "message": "Strategy determined",
                    "approach": text_field(data, "approach", ""),
                    "complexity": text_field(data, "complexity", "moderate"),
                }),
            ),
            MessageKind::PlanCreated => {
                let tasks: Vec<Value> = data
                    .get("tasks")
                    .and_then(Value::as_array)
                    .map(|tasks| {
                        tasks
                            .iter()
                            .map(|t| text_field(t, "description", ""))
                            .collect()
                    })
                    .unwrap_or_default();
                StreamEvent::new(
                    EventType::Planning,
                    Some("planning"),
                    json!({
                        "message": "Execution plan created",
                        "task_count": tasks.len(),
                        "tasks": tasks,
                    }),
                )
            }
            MessageKind::ExecutionComplete => {
                let statuses: Vec<Value> = data
                    .get("results")
                    .and_then(Value::as_array)
                    .map(|results| {
                        results
                            .iter()
                            .map(|r| text_field(r, "status", ""))
                            .collect()
                    })
                    .unwrap_or_default();
                StreamEvent::new(
                    EventType::Execution,
                    Some("execution"),
                    json!({
                        "message": "Tasks executed",
                        "completed_tasks": statuses.len(),
                        "results_preview": statuses,
                    }),
                )
            }
            MessageKind::AggregationComplete => {
                let summary = data.get("summary").and_then(Value::as_str).unwrap_or("");
                StreamEvent::new(
                    EventType::Aggregation,
                    Some("planning"),
                    json!({
                        "message": "Results aggregated",
                        "summary": truncate_chars(summary, SUMMARY_PREVIEW_CHARS),
                    }),
                )
            }
            MessageKind::SynthesisComplete => StreamEvent::new(
                EventType::Final,
                Some("strategy"),
                json!({
                    "message": "Final synthesis complete",
                    "answer": text_field(data, "final_answer", ""),
                }),
            ),
            MessageKind::Error => StreamEvent::new(
                EventType::Error,
                Some(&message.agent),
                json!({ "message": text_field(data, "error", "Unknown error") }),
            ),
        }
    }

    /// Closing event
    #[must_use]
    pub fn complete(&self, had_error: bool) -> StreamEvent {
        let message = if had_error {
            "Workflow finished with errors"
        } else {
            "Workflow completed successfully"
        };
        StreamEvent::new(EventType::Complete, None, json!({ "message": message }))
    }
}

/// Field of `data` as-is, or `default` when absent
fn text_field(data: &Value, key: &str, default: &str) -> Value {
    data.get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

enum Envelope {
    Opening(String, WorkflowStream),
    Running(WorkflowStream, bool),
    Closed,
}

/// Wrap a workflow stream in the `start` ... `complete` envelope.
///
/// Dropping the returned stream drops the workflow, which stops the
/// producer before its next stage.
pub fn event_stream(
    query: impl Into<String>,
    workflow: WorkflowStream,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    let formatter = StreamFormatter;
    futures::stream::unfold(
        Envelope::Opening(query.into(), workflow),
        move |envelope| async move {
            match envelope {
                Envelope::Opening(query, workflow) => {
                    Some((formatter.start(&query), Envelope::Running(workflow, false)))
                }
                Envelope::Running(mut workflow, had_error) => match workflow.next().await {
                    Some(message) => {
                        let had_error = had_error || message.kind == MessageKind::Error;
                        Some((formatter.format(&message), Envelope::Running(workflow, had_error)))
                    }
                    None => Some((formatter.complete(had_error), Envelope::Closed)),
                },
                Envelope::Closed => None,
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Strategy, Task, TaskResult};

    #[test]
    fn test_start_event() {
        let event = StreamFormatter.start("hi");
        assert_eq!(event.event_type, EventType::Start);
        assert!(event.agent.is_none());
        assert_eq!(event.data["query"], "hi");
        assert_eq!(event.data["message"], "Starting agent workflow...");
        assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp).is_ok());
    }

    #[test]
    fn test_strategy_event() {
        let strategy = Strategy::conversational("hi");
        let message = WorkflowMessage::new(
            "strategy",
            MessageKind::StrategyComplete,
            serde_json::to_value(&strategy).unwrap(),
        );
        let event = StreamFormatter.format(&message);
        assert_eq!(event.event_type, EventType::Strategy);
        assert_eq!(event.agent.as_deref(), Some("strategy"));
        assert_eq!(event.data["approach"], "Direct conversational response");
        assert_eq!(event.data["complexity"], "simple");
    }

    #[test]
    fn test_planning_event_lists_descriptions() {
        let message = WorkflowMessage::new(
            "planning",
            MessageKind::PlanCreated,
            json!({"tasks": [{"description": "a"}, {"description": "b"}]}),
        );
        let event = StreamFormatter.format(&message);
        assert_eq!(event.data["task_count"], 2);
        assert_eq!(event.data["tasks"], json!(["a", "b"]));
    }

    #[test]
    fn test_execution_event_previews_statuses() {
        let task = Task::new("t1", "", "web_search", "q");
        let results = vec![
            TaskResult::success(&task, "web_search", json!([])),
            TaskResult::failure(&task, "web_search", "down"),
        ];
        let message = WorkflowMessage::new(
            "execution",
            MessageKind::ExecutionComplete,
            json!({ "results": results }),
        );
        let event = StreamFormatter.format(&message);
        assert_eq!(event.event_type, EventType::Execution);
        assert_eq!(event.data["completed_tasks"], 2);
        assert_eq!(event.data["results_preview"], json!(["success", "error"]));
    }

    #[test]
    fn test_aggregation_summary_is_truncated() {
        let message = WorkflowMessage::new(
            "planning",
            MessageKind::AggregationComplete,
            json!({ "summary": "s".repeat(500) }),
        );
        let event = StreamFormatter.format(&message);
        assert_eq!(event.data["summary"].as_str().map(str::len), Some(200));
    }

    #[test]
    fn test_error_event() {
        let event = StreamFormatter.format(&WorkflowMessage::error("boom"));
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.agent.as_deref(), Some("system"));
        assert_eq!(event.data["message"], "boom");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let message = WorkflowMessage::new("strategy", MessageKind::StrategyComplete, json!({}));
        let event = StreamFormatter.format(&message);
        assert_eq!(event.data["approach"], "");
        assert_eq!(event.data["complexity"], "moderate");

        let message = WorkflowMessage::new("system", MessageKind::Error, json!({}));
        assert_eq!(StreamFormatter.format(&message).data["message"], "Unknown error");
    }

    #[test]
    fn test_complete_messages() {
        assert_eq!(
            StreamFormatter.complete(false).data["message"],
            "Workflow completed successfully"
        );
        assert_eq!(
            StreamFormatter.complete(true).data["message"],
            "Workflow finished with errors"
        );
    }

    #[test]
    fn test_sse_framing() {
        let event = StreamFormatter.complete(false);
        let framed = event.to_sse().unwrap();
        assert!(framed.starts_with("data: {\"type\":\"complete\""));
        assert!(framed.ends_with("\n\n"));

        let parsed: StreamEvent =
            serde_json::from_str(framed.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(parsed, event);
    }
}
