//! Plan runner - single forward pass over `execution_order`
//!
//! For each listed id, in order:
//! - the first task with that id is taken; ids with no task are skipped
//! - a task with dependencies runs only if every dependency id already
//!   completed earlier in this pass, otherwise it is skipped
//! - the task runs and its result is recorded as completed, whatever its status
//!
//! There is no reordering, retrying or parallelism. A dependency listed later
//! in the order than its dependent is never satisfied.

use crate::executor::TaskExecutor;
use crate::types::{Plan, TaskResult};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Runs whole plans through a `TaskExecutor`
#[derive(Clone)]
pub struct PlanRunner {
    executor: TaskExecutor,
}

impl PlanRunner {
    /// Create a runner
    #[must_use]
    pub fn new(executor: TaskExecutor) -> Self {
        Self { executor }
    }

    /// The executor tasks are handed to
    #[must_use]
    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    /// Run `plan` and return one result per executed entry of `execution_order`
    pub async fn run(&self, plan: &Plan) -> Vec<TaskResult> {
        let mut results = Vec::new();
        let mut completed: HashSet<&str> = HashSet::new();

        for task_id in &plan.execution_order {
            let Some(task) = plan.task(task_id) else {
                warn!(task_id = %task_id, "Task not found in plan, skipping");
                continue;
            };

            if !task
                .dependencies
                .iter()
                .all(|dep| completed.contains(dep.as_str()))
            {
                warn!(task_id = %task_id, dependencies = ?task.dependencies, "Dependencies not met, skipping");
                continue;
            }

            let result = self.executor.execute(task).await;
            debug!(task_id = %task_id, status = result.status.as_str(), "Task finished");
            results.push(result);
            completed.insert(task_id.as_str());
        }

        info!(
            planned = plan.execution_order.len(),
            executed = results.len(),
            "Plan execution complete"
        );
        results
    }
}
