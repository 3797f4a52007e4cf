//! Pipeline records
//!
//! Every record serializes to the JSON shape clients see in workflow
//! messages and stream events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn agent_strategy() -> String {
    "strategy".to_string()
}

fn agent_planning() -> String {
    "planning".to_string()
}

fn agent_execution() -> String {
    "execution".to_string()
}

// ============================================================================
// Strategy
// ============================================================================

/// High-level approach chosen for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Overall approach
    pub approach: String,
    /// simple / moderate / complex
    pub complexity: String,
    /// Tools the approach expects to need
    #[serde(default)]
    pub required_resources: Vec<String>,
    /// High-level subtasks
    #[serde(default)]
    pub subtasks: Vec<String>,
    /// Expected output description
    pub expected_output: String,
    /// Whether the query is small talk
    #[serde(default)]
    pub is_conversational: bool,
    /// The query being answered
    pub query: String,
    /// Producing agent
    #[serde(default = "agent_strategy")]
    pub agent: String,
    /// Failure that forced a fallback strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Strategy {
    /// Strategy for small talk; planning answers it with a canned reply
    #[must_use]
    pub fn conversational(query: impl Into<String>) -> Self {
        Self {
            approach: "Direct conversational response".to_string(),
            complexity: "simple".to_string(),
            required_resources: Vec::new(),
            subtasks: vec!["Generate friendly response".to_string()],
            expected_output: "Conversational reply".to_string(),
            is_conversational: true,
            query: query.into(),
            agent: agent_strategy(),
            error: None,
        }
    }

    /// Fixed strategy used when the strategy collaborator fails
    #[must_use]
    pub fn fallback(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            approach: "Simple web search and summarization".to_string(),
            complexity: "simple".to_string(),
            required_resources: vec!["web_search".to_string()],
            subtasks: vec![
                "Search for information".to_string(),
                "Summarize findings".to_string(),
            ],
            expected_output: "Summary of search results".to_string(),
            is_conversational: false,
            query: query.into(),
            agent: agent_strategy(),
            error: Some(error.into()),
        }
    }

    /// Strategy built from a reply that was not valid JSON; the prose becomes the approach
    #[must_use]
    pub fn from_prose(query: impl Into<String>, approach: impl Into<String>) -> Self {
        Self {
            approach: approach.into(),
            complexity: "moderate".to_string(),
            required_resources: vec!["web_search".to_string(), "document_analyzer".to_string()],
            subtasks: vec![
                "Research".to_string(),
                "Analyze".to_string(),
                "Synthesize".to_string(),
            ],
            expected_output: "Comprehensive answer".to_string(),
            is_conversational: false,
            query: query.into(),
            agent: agent_strategy(),
            error: None,
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// One tool invocation in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id within the plan
    pub task_id: String,
    /// What the task does
    #[serde(default)]
    pub description: String,
    /// Tool name
    pub tool: String,
    /// Tool input
    #[serde(default)]
    pub input: String,
    /// Ids of tasks that must have run earlier in the same pass
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Task {
    /// Create a task without dependencies
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        description: impl Into<String>,
        tool: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
            tool: tool.into(),
            input: input.into(),
            dependencies: Vec::new(),
        }
    }

    /// Add a dependency
    #[must_use]
    pub fn depends_on(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }
}

/// Task graph plus the order to walk it in
///
/// `execution_order` may omit tasks, repeat ids or name ids that have no
/// task; the runner tolerates all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Producing agent
    #[serde(default = "agent_planning")]
    pub agent: String,
    /// Tasks
    pub tasks: Vec<Task>,
    /// Task ids in execution order
    #[serde(default)]
    pub execution_order: Vec<String>,
    /// Estimated number of steps
    #[serde(default)]
    pub estimated_steps: usize,
    /// Whether this plan answers small talk
    #[serde(default)]
    pub is_conversational: bool,
    /// Approach of the strategy the plan was built from
    #[serde(default)]
    pub strategy_ref: String,
}

impl Plan {
    /// Create a plan; `estimated_steps` starts at the task count
    #[must_use]
    pub fn new(tasks: Vec<Task>, execution_order: Vec<String>) -> Self {
        Self {
            agent: agent_planning(),
            estimated_steps: tasks.len(),
            tasks,
            execution_order,
            is_conversational: false,
            strategy_ref: String::new(),
        }
    }

    /// Set the strategy reference
    #[must_use]
    pub fn with_strategy_ref(mut self, approach: impl Into<String>) -> Self {
        self.strategy_ref = approach.into();
        self
    }

    /// First task with the given id
    #[must_use]
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Outcome of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Tool returned a value
    Success,
    /// Tool failed or was unavailable
    Error,
}

impl TaskStatus {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Record produced once per attempted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task id
    pub task_id: String,
    /// Tool actually used (after fallback substitution)
    pub tool: String,
    /// Tool input
    pub input: String,
    /// Tool output, `null` on error
    pub result: Value,
    /// Outcome
    pub status: TaskStatus,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Producing agent
    #[serde(default = "agent_execution")]
    pub agent: String,
}

impl TaskResult {
    /// Successful result
    #[must_use]
    pub fn success(task: &Task, tool: impl Into<String>, result: Value) -> Self {
        Self {
            task_id: task.task_id.clone(),
            tool: tool.into(),
            input: task.input.clone(),
            result,
            status: TaskStatus::Success,
            error: None,
            agent: agent_execution(),
        }
    }

    /// Failed result
    #[must_use]
    pub fn failure(task: &Task, tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task_id: task.task_id.clone(),
            tool: tool.into(),
            input: task.input.clone(),
            result: Value::Null,
            status: TaskStatus::Error,
            error: Some(error.into()),
            agent: agent_execution(),
        }
    }

    /// Whether the task succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Execution results with a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResults {
    /// Producing agent
    #[serde(default = "agent_planning")]
    pub agent: String,
    /// Always "aggregation"
    pub stage: String,
    /// The query being answered
    pub query: String,
    /// Summary text
    pub summary: String,
    /// Number of results
    pub task_count: usize,
    /// Results in execution order
    pub execution_results: Vec<TaskResult>,
    /// Failure that forced the fallback summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregatedResults {
    /// Create an aggregation over `results`
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        summary: impl Into<String>,
        results: Vec<TaskResult>,
    ) -> Self {
        Self {
            agent: agent_planning(),
            stage: "aggregation".to_string(),
            query: query.into(),
            summary: summary.into(),
            task_count: results.len(),
            execution_results: results,
            error: None,
        }
    }

    /// Attach a failure description
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether any result came from the canned conversational path
    #[must_use]
    pub fn is_conversational(&self) -> bool {
        self.execution_results
            .iter()
            .any(|r| r.tool == crate::executor::DIRECT_LLM_TOOL)
    }
}

/// Final answer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalStatus {
    /// An answer was composed
    Completed,
    /// No answer could be composed
    Error,
}

/// Final answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    /// Producing agent
    #[serde(default = "agent_strategy")]
    pub agent: String,
    /// Always "synthesis"
    pub stage: String,
    /// Answer text
    pub final_answer: String,
    /// Outcome
    pub status: FinalStatus,
    /// Whether the answer is a canned conversational reply
    #[serde(default)]
    pub is_conversational: bool,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinalResponse {
    /// Completed answer
    #[must_use]
    pub fn completed(answer: impl Into<String>, is_conversational: bool) -> Self {
        Self {
            agent: agent_strategy(),
            stage: "synthesis".to_string(),
            final_answer: answer.into(),
            status: FinalStatus::Completed,
            is_conversational,
            error: None,
        }
    }

    /// Failed synthesis
    #[must_use]
    pub fn failed(answer: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            agent: agent_strategy(),
            stage: "synthesis".to_string(),
            final_answer: answer.into(),
            status: FinalStatus::Error,
            is_conversational: false,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Kind of a workflow message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Strategy stage finished
    StrategyComplete,
    /// Planning stage finished
    PlanCreated,
    /// All tasks ran
    ExecutionComplete,
    /// Results were aggregated
    AggregationComplete,
    /// Final answer composed
    SynthesisComplete,
    /// The workflow failed
    Error,
}

impl MessageKind {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrategyComplete => "strategy_complete",
            Self::PlanCreated => "plan_created",
            Self::ExecutionComplete => "execution_complete",
            Self::AggregationComplete => "aggregation_complete",
            Self::SynthesisComplete => "synthesis_complete",
            Self::Error => "error",
        }
    }
}

/// Entry in the append-only workflow log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMessage {
    /// Emitting agent
    pub agent: String,
    /// Message kind
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Payload
    pub data: Value,
}

impl WorkflowMessage {
    /// Create a message
    #[must_use]
    pub fn new(agent: impl Into<String>, kind: MessageKind, data: Value) -> Self {
        Self {
            agent: agent.into(),
            kind,
            data,
        }
    }

    /// Terminal error message
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(
            "system",
            MessageKind::Error,
            serde_json::json!({ "error": description.into() }),
        )
    }
}

/// State accumulated while one query runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The query
    pub query: String,
    /// Strategy stage output
    pub strategy: Option<Strategy>,
    /// Planning stage output
    pub plan: Option<Plan>,
    /// Execution stage output
    pub execution_results: Vec<TaskResult>,
    /// Synthesis stage output
    pub final_response: Option<FinalResponse>,
    /// Workflow log
    pub messages: Vec<WorkflowMessage>,
    /// Carried for clients; stages never loop back
    pub iteration: u32,
    /// Configured iteration ceiling
    pub max_iterations: u32,
}

impl WorkflowState {
    /// Fresh state for a query
    #[must_use]
    pub fn new(query: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            query: query.into(),
            strategy: None,
            plan: None,
            execution_results: Vec::new(),
            final_response: None,
            messages: Vec::new(),
            iteration: 0,
            max_iterations,
        }
    }

    /// Final answer text, empty before synthesis
    #[must_use]
    pub fn final_answer(&self) -> &str {
        self.final_response
            .as_ref()
            .map_or("", |r| r.final_answer.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_result_wire_shape() {
        let task = Task::new("t1", "search", "web_search", "rust");
        let ok = serde_json::to_value(TaskResult::success(&task, "web_search", json!([]))).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["agent"], "execution");
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(TaskResult::failure(&task, "web_search", "boom")).unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["result"], Value::Null);
        assert_eq!(err["error"], "boom");
    }

    #[test]
    fn test_message_kind_serializes_as_type() {
        let msg = WorkflowMessage::error("bad");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["agent"], "system");
        assert_eq!(json["data"]["error"], "bad");
        assert_eq!(MessageKind::PlanCreated.as_str(), "plan_created");
    }

    #[test]
    fn test_task_deserializes_with_defaults() {
        let task: Task =
            serde_json::from_value(json!({"task_id": "t1", "tool": "web_search"})).unwrap();
        assert!(task.dependencies.is_empty());
        assert_eq!(task.input, "");
    }

    #[test]
    fn test_plan_lookup_returns_first_match() {
        let plan = Plan::new(
            vec![
                Task::new("a", "first", "web_search", "x"),
                Task::new("a", "second", "web_search", "y"),
            ],
            vec!["a".to_string()],
        );
        assert_eq!(plan.task("a").map(|t| t.description.as_str()), Some("first"));
        assert!(plan.task("b").is_none());
        assert_eq!(plan.estimated_steps, 2);
    }

    #[test]
    fn test_conversational_aggregation() {
        let task = Task::new("c", "chat", "direct_llm", "hi");
        let agg = AggregatedResults::new(
            "hi",
            "",
            vec![TaskResult::success(&task, "direct_llm", json!("Hello!"))],
        );
        assert!(agg.is_conversational());
        assert_eq!(agg.task_count, 1);
    }
}
