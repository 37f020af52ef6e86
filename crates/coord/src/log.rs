//! Structured coordination event log.
//!
//! Entries are write-once and consumed by the external audit/observability
//! collaborator; the coordinator never blocks on that sink.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coordination event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationEvent {
    /// A decision was taken (e.g. task completion accepted)
    Decision,
    /// Conflicting intents detected
    Conflict,
    /// A conflict was resolved
    Resolution,
    /// Safety fallback engaged
    Fallback,
    /// General coordination traffic
    Coordination,
    /// State synchronization
    Sync,
    /// Work handed to an agent
    Handoff,
    /// Work escalated or returned to the queue
    Escalation,
}

/// Append-only record of one coordination event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationLogEntry {
    /// Monotonic sequence number within this coordinator
    pub seq: u64,
    /// Event kind
    pub event: CoordinationEvent,
    /// Source agent type (or "coordinator")
    pub source_type: String,
    /// Target agent type, when directed
    pub target_type: Option<String>,
    /// Structured payload
    pub payload: BTreeMap<String, serde_json::Value>,
    /// Whether the event records a conflict
    pub conflict: bool,
    /// Strategy used to resolve a conflict, when one was
    pub resolution: Option<String>,
    /// Confidence attached to a decision, when scored
    pub confidence: Option<f64>,
    /// Whether the recorded operation succeeded
    pub success: bool,
    /// Event timestamp (Unix epoch milliseconds)
    pub timestamp_ms: u64,
}

impl CoordinationLogEntry {
    /// Create a minimal successful entry.
    pub fn new(
        seq: u64,
        event: CoordinationEvent,
        source_type: impl Into<String>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            seq,
            event,
            source_type: source_type.into(),
            target_type: None,
            payload: BTreeMap::new(),
            conflict: false,
            resolution: None,
            confidence: None,
            success: true,
            timestamp_ms,
        }
    }

    pub fn with_target(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self
    }

    pub fn with_payload(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let entry = CoordinationLogEntry::new(7, CoordinationEvent::Handoff, "coordinator", 1_000)
            .with_target("survey")
            .with_payload("task_id", "task-000001")
            .with_confidence(0.8);

        assert_eq!(entry.seq, 7);
        assert_eq!(entry.event, CoordinationEvent::Handoff);
        assert_eq!(entry.target_type.as_deref(), Some("survey"));
        assert_eq!(entry.payload["task_id"], "task-000001");
        assert_eq!(entry.confidence, Some(0.8));
        assert!(entry.success);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let entry = CoordinationLogEntry::new(1, CoordinationEvent::Decision, "coordinator", 0)
            .with_confidence(1.4);
        assert_eq!(entry.confidence, Some(1.0));
    }

    #[test]
    fn test_serializes_snake_case() {
        let entry = CoordinationLogEntry::new(1, CoordinationEvent::Escalation, "coordinator", 0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"], "escalation");
    }
}
