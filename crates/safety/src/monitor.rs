//! Safe-action enforcement on telemetry loss or critical sensor faults.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::warn;

use pelorus_fleet::{CommandKind, DeviceKind};

/// The mandatory safe action for a device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackAction {
    /// Aerial devices land
    Land,
    /// Surface devices keep station
    HoldPosition,
}

impl FallbackAction {
    /// Deterministic kind → action mapping.
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Aerial => FallbackAction::Land,
            DeviceKind::Surface => FallbackAction::HoldPosition,
        }
    }

    /// The fleet command that applies this action.
    pub fn as_command(&self) -> CommandKind {
        match self {
            FallbackAction::Land => CommandKind::Land,
            FallbackAction::HoldPosition => CommandKind::Hover {
                duration_secs: None,
            },
        }
    }
}

/// Why the fallback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Telemetry link lost
    TelemetryLost,
    /// Critical sensor condition reported
    CriticalSensor,
}

impl FallbackReason {
    /// Human-readable tag recorded with the fallback.
    pub fn description(&self) -> &'static str {
        match self {
            FallbackReason::TelemetryLost => "connectivity fault: telemetry lost",
            FallbackReason::CriticalSensor => "safety fault: critical sensor condition",
        }
    }
}

/// Immutable record of one fallback activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRecord {
    /// Device the fallback applies to
    pub device_id: String,
    /// Device kind at trigger time
    pub kind: DeviceKind,
    /// Safe action issued
    pub action: FallbackAction,
    /// Why the fallback fired
    pub reason: FallbackReason,
    /// Trigger timestamp (Unix epoch milliseconds)
    pub timestamp_ms: u64,
}

/// Event-driven safety monitor with an append-only activation history.
#[derive(Debug, Default)]
pub struct FallbackMonitor {
    history: Mutex<Vec<FallbackRecord>>,
}

impl FallbackMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the mandatory safe action for a device.
    ///
    /// The returned record's action must be applied before processing any
    /// further decision-engine output for the device in the same cycle.
    pub fn trigger(
        &self,
        device_id: &str,
        kind: DeviceKind,
        reason: FallbackReason,
        timestamp_ms: u64,
    ) -> FallbackRecord {
        let record = FallbackRecord {
            device_id: device_id.to_string(),
            kind,
            action: FallbackAction::for_kind(kind),
            reason,
            timestamp_ms,
        };
        warn!(
            device_id,
            action = ?record.action,
            reason = reason.description(),
            "safety fallback triggered"
        );
        self.history.lock().unwrap().push(record.clone());
        record
    }

    /// Snapshot of the activation history, oldest first.
    pub fn history(&self) -> Vec<FallbackRecord> {
        self.history.lock().unwrap().clone()
    }

    /// Activations recorded for one device, oldest first.
    pub fn history_for(&self, device_id: &str) -> Vec<FallbackRecord> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.device_id == device_id)
            .cloned()
            .collect()
    }
}
