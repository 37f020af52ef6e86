//! Coordinator error taxonomy.

use thiserror::Error;

use crate::tasks::TaskStatus;

/// Task coordinator errors
#[derive(Debug, Error)]
pub enum CoordError {
    /// No agent with this identity is registered
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// An agent with this identity is already registered
    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    /// No task with this identity exists
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The requested task transition is not allowed
    #[error("Task {task_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Task being transitioned
        task_id: String,
        /// Current status
        from: TaskStatus,
        /// Requested status
        to: TaskStatus,
    },
}
