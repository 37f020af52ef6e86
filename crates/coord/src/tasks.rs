//! Task domain model and lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for an eligible agent
    Pending,
    /// Paired with an agent, not yet started
    Assigned,
    /// Being worked
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    /// Check if status is terminal (completed or failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Check if transition to new status is valid
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        match (self, new_status) {
            (TaskStatus::Pending, TaskStatus::Assigned) => true,
            // Agent pause hands an assigned or running task back to the queue
            (TaskStatus::Assigned, TaskStatus::Pending) => true,
            (TaskStatus::Assigned, TaskStatus::InProgress) => true,
            (TaskStatus::InProgress, TaskStatus::Pending) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Failed) => true,
            // Terminal states cannot transition
            _ => false,
        }
    }
}

/// A unit of work routed through the coordinator.
///
/// Immutable once terminal, except for audit annotation on the error field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub task_id: String,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Priority
    pub priority: TaskPriority,
    /// Lifecycle status
    pub status: TaskStatus,
    /// Agent the task is assigned to, if any
    pub assigned_agent: Option<String>,
    /// Preferred agent type, constraining assignment when set
    pub preferred_agent_type: Option<String>,
    /// Creation timestamp (Unix epoch milliseconds)
    pub created_at_ms: u64,
    /// Work start timestamp (Unix epoch milliseconds)
    pub started_at_ms: Option<u64>,
    /// Terminal timestamp (Unix epoch milliseconds)
    pub completed_at_ms: Option<u64>,
    /// Error message, set when the task failed
    pub error: Option<String>,
}

/// Creation input for a new task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    /// Constrain assignment to agents of this type
    pub preferred_agent_type: Option<String>,
}

impl TaskSpec {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            preferred_agent_type: None,
        }
    }

    pub fn preferring(mut self, agent_type: impl Into<String>) -> Self {
        self.preferred_agent_type = Some(agent_type.into());
        self
    }

    /// Materialize the spec into a pending task.
    pub fn into_task(self, task_id: String, timestamp_ms: u64) -> Task {
        Task {
            task_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: TaskStatus::Pending,
            assigned_agent: None,
            preferred_agent_type: self.preferred_agent_type,
            created_at_ms: timestamp_ms,
            started_at_ms: None,
            completed_at_ms: None,
            error: None,
        }
    }
}
