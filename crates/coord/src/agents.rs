//! Agent pool domain models.

use serde::{Deserialize, Serialize};

/// Agent availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Running and assignment-eligible
    Active,
    /// Parked (restart window); not assignment-eligible
    Idle,
    /// Paused by an operator; not assignment-eligible
    Paused,
    /// Faulted; requires a start to recover
    Error,
}

impl AgentStatus {
    /// Check if an agent in this status may take new work
    pub fn is_eligible(&self) -> bool {
        matches!(self, AgentStatus::Active)
    }
}

/// Rolling performance snapshot for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    /// Completed over total assigned, in [0, 1]
    pub efficiency: f64,
    /// Completed over completed-plus-failed, in [0, 1]
    pub success_rate: f64,
    /// Mean time from start to completion, in milliseconds
    pub avg_response_ms: f64,
    /// Number of failed tasks attributed to this agent
    pub error_count: u64,
}

impl Default for AgentPerformance {
    fn default() -> Self {
        Self {
            efficiency: 1.0,
            success_rate: 1.0,
            avg_response_ms: 0.0,
            error_count: 0,
        }
    }
}

/// A logical work unit eligible for task assignment.
///
/// May correspond 1:1 to a fleet device or be an abstract compute role;
/// the coordinator does not care which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier
    pub agent_id: String,
    /// Declared type/capability (e.g. "survey", "relay", "analysis")
    pub agent_type: String,
    /// Availability status
    pub status: AgentStatus,
    /// Task currently assigned, if any
    pub current_task: Option<String>,
    /// Tasks completed successfully
    pub completed_tasks: u64,
    /// Tasks ever assigned
    pub total_tasks: u64,
    /// Performance snapshot
    pub performance: AgentPerformance,
}

impl Agent {
    /// Check if this agent can take a task of the given preferred type.
    pub fn accepts(&self, preferred_type: Option<&str>) -> bool {
        self.status.is_eligible()
            && self.current_task.is_none()
            && preferred_type.map_or(true, |t| self.agent_type == t)
    }

    /// Fold a completed task into the performance snapshot.
    pub fn record_completion(&mut self, response_ms: u64) {
        self.completed_tasks += 1;
        let n = self.completed_tasks as f64;
        self.performance.avg_response_ms =
            self.performance.avg_response_ms * (n - 1.0) / n + response_ms as f64 / n;
        self.refresh_rates();
    }

    /// Fold a failed task into the performance snapshot.
    pub fn record_failure(&mut self) {
        self.performance.error_count += 1;
        self.refresh_rates();
    }

    fn refresh_rates(&mut self) {
        let attempts = self.completed_tasks + self.performance.error_count;
        self.performance.success_rate = if attempts == 0 {
            1.0
        } else {
            self.completed_tasks as f64 / attempts as f64
        };
        self.performance.efficiency = if self.total_tasks == 0 {
            1.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64
        };
    }
}

/// Registration input for a new agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent identifier
    pub agent_id: String,
    /// Declared type/capability
    pub agent_type: String,
}

impl AgentSpec {
    pub fn new(agent_id: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_type: agent_type.into(),
        }
    }

    /// Materialize the spec into an active agent.
    pub fn into_agent(self) -> Agent {
        Agent {
            agent_id: self.agent_id,
            agent_type: self.agent_type,
            status: AgentStatus::Active,
            current_task: None,
            completed_tasks: 0,
            total_tasks: 0,
            performance: AgentPerformance::default(),
        }
    }
}
