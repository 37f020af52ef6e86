//! Command model: a closed set of command kinds and a per-command
//! lifecycle state machine.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use pelorus_nav::Coordinate;

/// Single device command enumeration.
///
/// Closed set: adding a kind is a compile-time-checked exercise across the
/// executor's match arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandKind {
    /// Lift off to cruise (or the requested) altitude
    Takeoff {
        /// Altitude to climb to, in meters; defaults to the configured cruise altitude
        altitude_m: Option<f64>,
    },
    /// Land and settle to idle
    Land,
    /// Transit to a target position
    Goto {
        /// Target position
        target: Coordinate,
    },
    /// Keep station at the current position
    Hover {
        /// Hold duration in seconds (indefinite if None)
        duration_secs: Option<u32>,
    },
    /// Return to the home point
    ReturnHome,
    /// Unconditional emergency stop; the only command that may interrupt
    /// an in-progress command
    EmergencyStop {
        /// Reason for the stop
        reason: String,
    },
    /// Begin following an installed route
    FollowRoute {
        /// Route identifier
        route_id: String,
    },
}

impl CommandKind {
    /// Short kind name used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Takeoff { .. } => "takeoff",
            CommandKind::Land => "land",
            CommandKind::Goto { .. } => "goto",
            CommandKind::Hover { .. } => "hover",
            CommandKind::ReturnHome => "return_home",
            CommandKind::EmergencyStop { .. } => "emergency_stop",
            CommandKind::FollowRoute { .. } => "follow_route",
        }
    }
}

/// Command lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// Accepted, not yet executing
    Pending,
    /// Execution in progress
    Executing,
    /// Executed successfully
    Completed,
    /// Execution failed; see the command's failure note
    Failed,
}

impl CommandStatus {
    /// Check if status is terminal (completed or failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommandStatus::Completed | CommandStatus::Failed)
    }

    /// Check if transition to new status is valid
    pub fn can_transition_to(&self, new_status: CommandStatus) -> bool {
        match (self, new_status) {
            (CommandStatus::Pending, CommandStatus::Executing) => true,
            (CommandStatus::Pending, CommandStatus::Failed) => true,
            (CommandStatus::Executing, CommandStatus::Completed) => true,
            (CommandStatus::Executing, CommandStatus::Failed) => true,
            // Terminal states cannot transition
            _ => false,
        }
    }
}

/// A command issued to one device.
///
/// Append-only once created; only the lifecycle fields mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Unique command identifier
    pub command_id: String,
    /// Target device
    pub device_id: String,
    /// Command kind and parameters
    pub kind: CommandKind,
    /// Lifecycle status
    pub status: CommandStatus,
    /// Failure note, set when status is Failed
    pub failure: Option<String>,
    /// Creation timestamp (Unix epoch milliseconds)
    pub created_at_ms: u64,
    /// Terminal timestamp (Unix epoch milliseconds)
    pub completed_at_ms: Option<u64>,
}

impl Command {
    /// Create a new pending command.
    pub fn new(
        command_id: String,
        device_id: String,
        kind: CommandKind,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            command_id,
            device_id,
            kind,
            status: CommandStatus::Pending,
            failure: None,
            created_at_ms: timestamp_ms,
            completed_at_ms: None,
        }
    }

    /// Mark execution as started.
    pub fn mark_executing(&mut self) {
        debug_assert!(self.status.can_transition_to(CommandStatus::Executing));
        self.status = CommandStatus::Executing;
    }

    /// Mark the command completed.
    pub fn complete(&mut self, timestamp_ms: u64) {
        debug_assert!(self.status.can_transition_to(CommandStatus::Completed));
        self.status = CommandStatus::Completed;
        self.completed_at_ms = Some(timestamp_ms);
    }

    /// Mark the command failed with a reason.
    pub fn fail(&mut self, reason: impl Into<String>, timestamp_ms: u64) {
        debug_assert!(self.status.can_transition_to(CommandStatus::Failed));
        self.status = CommandStatus::Failed;
        self.failure = Some(reason.into());
        self.completed_at_ms = Some(timestamp_ms);
    }
}

/// Acknowledgement returned by `send_command`.
///
/// The call acknowledges acceptance, never the execution result; the
/// `completion` receiver resolves with the command's terminal state once
/// the executor gets there.
#[derive(Debug)]
pub struct CommandTicket {
    /// Identifier of the accepted command
    pub command_id: String,
    /// Resolves with the terminal command record
    pub completion: oneshot::Receiver<Command>,
}
