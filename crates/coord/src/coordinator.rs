//! Task coordinator: agent pool, task queue, first-available assignment.
//!
//! Assignment is first-available by registration order, not load-balanced;
//! a pending task with no eligible agent is retried only on the next
//! explicit `add_task`/`assign` call. There is no background retry loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use pelorus_core::audit::{AuditSink, NullSink};
use pelorus_core::config::CoordinationConfig;
use pelorus_core::time::{next_id, now_ms};

use crate::agents::{Agent, AgentSpec, AgentStatus};
use crate::error::CoordError;
use crate::log::{CoordinationEvent, CoordinationLogEntry};
use crate::tasks::{Task, TaskSpec, TaskStatus};

/// Outcome of one assignment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Task paired with this agent
    Assigned(String),
    /// Task stays pending; no eligible agent right now
    NoAgentAvailable,
    /// No-op: the task was not pending
    NotPending,
}

#[derive(Default)]
struct CoordInner {
    agents: HashMap<String, Agent>,
    agent_order: Vec<String>,
    tasks: HashMap<String, Task>,
    log: Vec<CoordinationLogEntry>,
    seq: u64,
    sink_failures: u64,
}

/// Explicit coordination context owning agents, tasks and the event log.
pub struct Coordinator {
    config: CoordinationConfig,
    inner: Arc<Mutex<CoordInner>>,
    sink: Arc<dyn AuditSink>,
}

impl Coordinator {
    pub fn new(config: CoordinationConfig) -> Self {
        Self::with_sink(config, Arc::new(NullSink))
    }

    /// Construct with an external audit sink. Sink failures are swallowed
    /// and counted, never propagated.
    pub fn with_sink(config: CoordinationConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(CoordInner::default())),
            sink,
        }
    }

    /// Register an agent; new agents start `Active` and eligible.
    pub fn register_agent(&self, spec: AgentSpec) -> Result<Agent, CoordError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.agents.contains_key(&spec.agent_id) {
            return Err(CoordError::DuplicateAgent(spec.agent_id));
        }
        let agent = spec.into_agent();
        info!(agent_id = %agent.agent_id, agent_type = %agent.agent_type, "agent registered");
        inner.agent_order.push(agent.agent_id.clone());
        inner.agents.insert(agent.agent_id.clone(), agent.clone());
        Ok(agent)
    }

    pub fn agent(&self, agent_id: &str) -> Option<Agent> {
        self.inner.lock().unwrap().agents.get(agent_id).cloned()
    }

    /// All agents in registration order.
    pub fn agents(&self) -> Vec<Agent> {
        let inner = self.inner.lock().unwrap();
        inner
            .agent_order
            .iter()
            .filter_map(|id| inner.agents.get(id).cloned())
            .collect()
    }

    /// Create a pending task and immediately attempt assignment.
    ///
    /// Returns the task with `Pending` or `Assigned` status depending on
    /// agent availability at call time.
    pub fn add_task(&self, spec: TaskSpec) -> Task {
        let now = now_ms();
        let task_id = next_id("task");
        let task = spec.into_task(task_id.clone(), now);

        let mut inner = self.inner.lock().unwrap();
        inner.tasks.insert(task_id.clone(), task);
        info!(task_id = %task_id, "task created");

        self.try_assign_locked(&mut inner, &task_id);
        inner.tasks[&task_id].clone()
    }

    /// Attempt to pair a pending task with the first available agent.
    ///
    /// A no-op (with an informative outcome) unless the task is pending;
    /// when no agent is eligible nothing changes and nothing is logged, so
    /// repeated calls are idempotent.
    pub fn assign(&self, task_id: &str) -> Result<AssignOutcome, CoordError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.tasks.contains_key(task_id) {
            return Err(CoordError::TaskNotFound(task_id.to_string()));
        }
        Ok(self.try_assign_locked(&mut inner, task_id))
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.inner.lock().unwrap().tasks.get(task_id).cloned()
    }

    /// Move an assigned task into `InProgress`.
    pub fn begin_task(&self, task_id: &str) -> Result<Task, CoordError> {
        let now = now_ms();
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoordError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Assigned {
            return Err(CoordError::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to: TaskStatus::InProgress,
            });
        }
        task.status = TaskStatus::InProgress;
        task.started_at_ms = Some(now);
        Ok(task.clone())
    }

    /// Complete an in-progress task: frees the agent, bumps its counters
    /// and emits a scored `Decision` log entry.
    pub fn complete_task(&self, task_id: &str) -> Result<Task, CoordError> {
        let now = now_ms();
        let mut inner = self.inner.lock().unwrap();

        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoordError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::InProgress {
            return Err(CoordError::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to: TaskStatus::Completed,
            });
        }
        task.status = TaskStatus::Completed;
        task.completed_at_ms = Some(now);
        let response_ms = now.saturating_sub(task.started_at_ms.unwrap_or(task.created_at_ms));
        let agent_id = task.assigned_agent.clone();
        let snapshot = task.clone();

        let mut confidence = 1.0;
        let mut agent_type = None;
        if let Some(agent_id) = &agent_id {
            if let Some(agent) = inner.agents.get_mut(agent_id) {
                agent.current_task = None;
                agent.record_completion(response_ms);
                confidence = agent.performance.success_rate;
                agent_type = Some(agent.agent_type.clone());
            }
        }

        info!(task_id, agent_id = ?agent_id, "task completed");
        self.emit(&mut inner, |seq, ts| {
            let mut entry = CoordinationLogEntry::new(seq, CoordinationEvent::Decision, "coordinator", ts)
                .with_payload("task_id", task_id)
                .with_confidence(confidence);
            if let Some(agent_type) = &agent_type {
                entry = entry.with_target(agent_type.clone());
            }
            if let Some(agent_id) = &agent_id {
                entry = entry.with_payload("agent_id", agent_id.clone());
            }
            entry
        });

        Ok(snapshot)
    }

    /// Fail an in-progress task with an error message; frees the agent and
    /// bumps its error count.
    pub fn fail_task(&self, task_id: &str, error: impl Into<String>) -> Result<Task, CoordError> {
        let now = now_ms();
        let mut inner = self.inner.lock().unwrap();

        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoordError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::InProgress {
            return Err(CoordError::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to: TaskStatus::Failed,
            });
        }
        task.status = TaskStatus::Failed;
        task.completed_at_ms = Some(now);
        task.error = Some(error.into());
        let agent_id = task.assigned_agent.clone();
        let snapshot = task.clone();

        if let Some(agent_id) = &agent_id {
            if let Some(agent) = inner.agents.get_mut(agent_id) {
                agent.current_task = None;
                agent.record_failure();
            }
        }

        warn!(task_id, agent_id = ?agent_id, "task failed");
        self.emit(&mut inner, |seq, ts| {
            let mut entry =
                CoordinationLogEntry::new(seq, CoordinationEvent::Escalation, "coordinator", ts)
                    .with_payload("task_id", task_id);
            entry.success = false;
            if let Some(agent_id) = &agent_id {
                entry = entry.with_payload("agent_id", agent_id.clone());
            }
            entry
        });

        Ok(snapshot)
    }

    /// Activate an agent.
    pub fn start_agent(&self, agent_id: &str) -> Result<(), CoordError> {
        let mut inner = self.inner.lock().unwrap();
        let agent = inner
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| CoordError::AgentNotFound(agent_id.to_string()))?;
        agent.status = AgentStatus::Active;
        Ok(())
    }

    /// Pause an agent immediately.
    ///
    /// The only coordinator-side preemption: a task the agent was holding
    /// goes straight back to the pending queue with an escalation entry.
    pub fn pause_agent(&self, agent_id: &str) -> Result<(), CoordError> {
        let mut inner = self.inner.lock().unwrap();
        let agent = inner
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| CoordError::AgentNotFound(agent_id.to_string()))?;
        agent.status = AgentStatus::Paused;
        let preempted = agent.current_task.take();

        if let Some(task_id) = preempted {
            if let Some(task) = inner.tasks.get_mut(&task_id) {
                if task.status.can_transition_to(TaskStatus::Pending) {
                    task.status = TaskStatus::Pending;
                    task.assigned_agent = None;
                    task.started_at_ms = None;
                }
            }
            warn!(agent_id, task_id = %task_id, "agent paused, task returned to queue");
            self.emit(&mut inner, |seq, ts| {
                CoordinationLogEntry::new(seq, CoordinationEvent::Escalation, "coordinator", ts)
                    .with_payload("task_id", task_id.clone())
                    .with_payload("agent_id", agent_id)
                    .with_payload("cause", "agent_paused")
            });
        }
        Ok(())
    }

    /// Restart an agent: parked at `Idle` immediately, `Active` again once
    /// the configured restart window elapses. Not assignment-eligible in
    /// between. Requires a tokio runtime.
    pub fn restart_agent(&self, agent_id: &str) -> Result<(), CoordError> {
        {
            let mut inner = self.inner.lock().unwrap();
            let agent = inner
                .agents
                .get_mut(agent_id)
                .ok_or_else(|| CoordError::AgentNotFound(agent_id.to_string()))?;
            agent.status = AgentStatus::Idle;
            info!(agent_id, "agent restarting");
        }

        let inner = Arc::clone(&self.inner);
        let window_ms = self.config.agent_restart_ms;
        let agent_id = agent_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(window_ms)).await;
            let mut inner = inner.lock().unwrap();
            if let Some(agent) = inner.agents.get_mut(&agent_id) {
                // A pause issued during the window wins over the restart
                if agent.status == AgentStatus::Idle {
                    agent.status = AgentStatus::Active;
                    info!(agent_id = %agent_id, "agent restarted");
                }
            }
        });
        Ok(())
    }

    /// Snapshot of the coordination log, oldest first.
    pub fn log(&self) -> Vec<CoordinationLogEntry> {
        self.inner.lock().unwrap().log.clone()
    }

    /// Number of audit sink emissions that failed and were swallowed.
    pub fn sink_failures(&self) -> u64 {
        self.inner.lock().unwrap().sink_failures
    }

    fn try_assign_locked(&self, inner: &mut CoordInner, task_id: &str) -> AssignOutcome {
        let (status, preferred) = match inner.tasks.get(task_id) {
            Some(task) => (task.status, task.preferred_agent_type.clone()),
            None => return AssignOutcome::NotPending,
        };
        if status != TaskStatus::Pending {
            return AssignOutcome::NotPending;
        }

        let chosen = inner
            .agent_order
            .iter()
            .find(|id| {
                inner
                    .agents
                    .get(*id)
                    .map(|a| a.accepts(preferred.as_deref()))
                    .unwrap_or(false)
            })
            .cloned();

        let Some(agent_id) = chosen else {
            return AssignOutcome::NoAgentAvailable;
        };

        let mut agent_type = String::new();
        if let Some(task) = inner.tasks.get_mut(task_id) {
            task.status = TaskStatus::Assigned;
            task.assigned_agent = Some(agent_id.clone());
        }
        if let Some(agent) = inner.agents.get_mut(&agent_id) {
            agent.current_task = Some(task_id.to_string());
            agent.total_tasks += 1;
            agent_type = agent.agent_type.clone();
        }

        info!(task_id, agent_id = %agent_id, "task assigned");
        self.emit(inner, |seq, ts| {
            CoordinationLogEntry::new(seq, CoordinationEvent::Handoff, "coordinator", ts)
                .with_target(agent_type.clone())
                .with_payload("task_id", task_id)
                .with_payload("agent_id", agent_id.clone())
        });

        AssignOutcome::Assigned(agent_id)
    }

    fn emit(
        &self,
        inner: &mut CoordInner,
        build: impl FnOnce(u64, u64) -> CoordinationLogEntry,
    ) {
        inner.seq += 1;
        let entry = build(inner.seq, now_ms());

        match serde_json::to_value(&entry) {
            Ok(value) => {
                if let Err(e) = self.sink.emit("coordination_log", &value) {
                    inner.sink_failures += 1;
                    warn!(error = %e, "audit sink emission failed");
                }
            }
            Err(e) => {
                inner.sink_failures += 1;
                warn!(error = %e, "coordination log serialization failed");
            }
        }

        inner.log.push(entry);
    }
}
