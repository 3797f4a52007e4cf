//! Workflow configuration

/// Default iteration ceiling reported in workflow state
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Iteration ceiling carried in `WorkflowState`
    pub max_iterations: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl WorkflowConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }
}
