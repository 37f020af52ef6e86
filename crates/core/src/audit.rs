//! Audit/observability sink boundary.
//!
//! Every coordination log entry and navigation decision is a candidate for
//! emission to an external append-only store. The core never blocks on that
//! store: a failed emission is swallowed by the caller, counted, and logged
//! as an advisory.

use serde_json::Value;
use std::sync::Mutex;
use thiserror::Error;

/// Sink emission errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink is unreachable or refused the record
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// External append-only audit store.
///
/// Implementations must be cheap to call from state-mutating paths;
/// anything slow belongs behind a channel on the implementor's side.
pub trait AuditSink: Send + Sync {
    /// Emit one record of the given kind (e.g. `"coordination_log"`,
    /// `"navigation_decision"`).
    fn emit(&self, kind: &str, payload: &Value) -> Result<(), SinkError>;
}

/// Sink that discards everything. The default when no collaborator is wired.
#[derive(Debug, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn emit(&self, _kind: &str, _payload: &Value) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory sink for tests and local inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(String, Value)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<(String, Value)> {
        self.records.lock().expect("sink poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("sink poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn emit(&self, kind: &str, payload: &Value) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("sink poisoned")
            .push((kind.to_string(), payload.clone()));
        Ok(())
    }
}

/// Sink that always fails; used to exercise the swallow-and-advise path.
#[derive(Debug, Default)]
pub struct FailingSink;

impl AuditSink for FailingSink {
    fn emit(&self, _kind: &str, _payload: &Value) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("injected failure".to_string()))
    }
}
