//! Task coordination for PelorusCore.
//!
//! Owns a pool of logical agents (capability + availability), a task
//! queue, and a first-available assignment policy, emitting a structured
//! event log consumed by the external audit collaborator.

pub mod agents;
pub mod coordinator;
pub mod error;
pub mod log;
pub mod tasks;

pub use agents::{Agent, AgentPerformance, AgentSpec, AgentStatus};
pub use coordinator::{AssignOutcome, Coordinator};
pub use error::CoordError;
pub use log::{CoordinationEvent, CoordinationLogEntry};
pub use tasks::{Task, TaskPriority, TaskSpec, TaskStatus};
