//! Task executor
//!
//! Runs one task against the tool registry and always produces a
//! `TaskResult`. Tool failures become `status = "error"` results; unknown
//! tool names degrade to `web_search`; `direct_llm` tasks are answered from
//! a fixed table of conversational replies without touching any tool.

use crate::types::{Task, TaskResult};
use std::sync::Arc;
use strata_tools::ToolRegistry;
use tracing::{debug, error, warn};

/// Pseudo-tool answered with a canned conversational reply
pub const DIRECT_LLM_TOOL: &str = "direct_llm";

/// Tool substituted for unknown tool names
pub const FALLBACK_TOOL: &str = "web_search";

/// Conversational reply category, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationalReply {
    /// Contains hello / hi / hey / greetings
    Greeting,
    /// Contains "how are you" / "how do you do"
    WellBeing,
    /// Contains thanks / "thank you"
    Thanks,
    /// Contains bye / goodbye / "see you"
    Farewell,
    /// Exactly ok / okay / sure / yes
    Affirmation,
    /// Exactly no
    Negation,
    /// Fewer than 5 characters
    VeryShort,
    /// Anything else
    Generic,
}

impl ConversationalReply {
    /// Classify an input; the first matching rule wins
    #[must_use]
    pub fn classify(input: &str) -> Self {
        let lower = input.trim().to_lowercase();
        let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if contains_any(&["hello", "hi", "hey", "greetings"]) {
            Self::Greeting
        } else if contains_any(&["how are you", "how do you do"]) {
            Self::WellBeing
        } else if contains_any(&["thanks", "thank you"]) {
            Self::Thanks
        } else if contains_any(&["bye", "goodbye", "see you"]) {
            Self::Farewell
        } else if matches!(lower.as_str(), "ok" | "okay" | "sure" | "yes") {
            Self::Affirmation
        } else if lower == "no" {
            Self::Negation
        } else if lower.chars().count() < 5 {
            Self::VeryShort
        } else {
            Self::Generic
        }
    }

    /// Reply text; the last two categories echo the original input
    #[must_use]
    pub fn render(self, input: &str) -> String {
        match self {
            Self::Greeting => "Hello! 👋 How can I help you today?".to_string(),
            Self::WellBeing => "I'm doing great, thanks for asking! I'm here and ready to assist you. How can I help?".to_string(),
            Self::Thanks => "You're welcome! 😊 Is there anything else I can help you with?".to_string(),
            Self::Farewell => "Goodbye! 👋 Have a great day!".to_string(),
            Self::Affirmation => "Great! What would you like to do next?".to_string(),
            Self::Negation => "No problem! Let me know if you need anything else.".to_string(),
            Self::VeryShort => {
                format!("I see you said '{input}'. How can I assist you with that?")
            }
            Self::Generic => format!(
                "That's interesting! I'd be happy to help you with '{input}'. What would you like to know?"
            ),
        }
    }
}

/// Canned reply for a conversational input
#[must_use]
pub fn conversational_reply(input: &str) -> String {
    ConversationalReply::classify(input).render(input)
}

/// Executes single tasks against a shared registry
#[derive(Clone)]
pub struct TaskExecutor {
    registry: Arc<ToolRegistry>,
}

impl TaskExecutor {
    /// Create an executor over `registry`
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry tasks run against
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute one task. Never fails; problems are reported in the result.
    pub async fn execute(&self, task: &Task) -> TaskResult {
        debug!(task_id = %task.task_id, tool = %task.tool, "Executing task");

        if task.tool == DIRECT_LLM_TOOL {
            let reply = conversational_reply(&task.input);
            return TaskResult::success(task, DIRECT_LLM_TOOL, serde_json::Value::String(reply));
        }

        let tool_name = if self.registry.has(&task.tool) {
            task.tool.as_str()
        } else {
            warn!(task_id = %task.task_id, tool = %task.tool, fallback = FALLBACK_TOOL, "Tool not found, using fallback");
            FALLBACK_TOOL
        };

        let Some(tool) = self.registry.lookup(tool_name) else {
            error!(task_id = %task.task_id, tool = %tool_name, "Fallback tool not registered");
            return TaskResult::failure(task, tool_name, format!("tool not found: {tool_name}"));
        };

        match tool.execute(&task.input).await {
            Ok(value) => TaskResult::success(task, tool_name, value),
            Err(e) => {
                error!(task_id = %task.task_id, tool = %tool_name, error = %e, "Task execution error");
                TaskResult::failure(task, tool_name, e.to_string())
            }
        }
    }
}
