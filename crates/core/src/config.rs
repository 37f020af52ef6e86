//! Configuration management for PelorusCore.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for one coordination core instance.
///
/// Every fleet, sensor and coordination tunable lives here so that a test
/// can construct a core with tightened bounds or shortened delays instead
/// of reaching for globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PelorusConfig {
    pub fleet: FleetConfig,
    pub sensors: SensorConfig,
    pub nav: NavConfig,
    pub coordination: CoordinationConfig,
}

/// Device registry and command executor tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Maximum number of aerial devices the registry accepts.
    pub max_aerial: usize,
    /// Maximum number of surface devices the registry accepts.
    pub max_surface: usize,
    /// Bound on the fleet-wide command history.
    pub command_history: usize,
    /// Bound on each device's command queue.
    pub device_queue: usize,
    /// Settle delay applied before a takeoff completes, in milliseconds.
    pub takeoff_settle_ms: u64,
    /// Settle delay applied before a landing completes, in milliseconds.
    pub land_settle_ms: u64,
    /// Settle delay for all other asynchronous commands, in milliseconds.
    pub command_settle_ms: u64,
    /// Cruise altitude assigned on takeoff, in meters.
    pub cruise_altitude_m: f64,
    /// Battery percentage below which a LowBattery advisory is raised.
    pub low_battery_percent: f64,
    /// Signal percentage below which a WeakSignal advisory is raised.
    pub weak_signal_percent: f64,
    /// Telemetry age beyond which a StaleTelemetry advisory is raised, in milliseconds.
    pub stale_telemetry_ms: u64,
}

/// Sensor aggregation tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Bound on each per-device per-kind reading ring buffer.
    pub reading_buffer: usize,
    /// Window within which a critical collision reading is still actionable, in milliseconds.
    pub collision_window_ms: u64,
}

/// Navigation decision engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavConfig {
    /// Obstacles closer than this are considered for avoidance, in range units.
    pub safety_distance: f64,
    /// Fleet-wide risk tolerance in [0, 1]; scales every decision's confidence.
    pub risk_tolerance: f64,
    /// Bound on each device's decision history.
    pub decision_history: usize,
}

/// Task coordinator tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Window an agent spends in `Idle` during a restart, in milliseconds.
    pub agent_restart_ms: u64,
}

impl PelorusConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            fleet: FleetConfig {
                max_aerial: 5,
                max_surface: 10,
                command_history: 100,
                device_queue: 100,
                takeoff_settle_ms: 2_000,
                land_settle_ms: 3_000,
                command_settle_ms: 1_000,
                cruise_altitude_m: 50.0,
                low_battery_percent: 20.0,
                weak_signal_percent: 30.0,
                stale_telemetry_ms: 60_000,
            },
            sensors: SensorConfig {
                reading_buffer: 100,
                collision_window_ms: 5_000,
            },
            nav: NavConfig {
                safety_distance: 50.0,
                risk_tolerance: 0.3,
                decision_history: 100,
            },
            coordination: CoordinationConfig {
                agent_restart_ms: 1_000,
            },
        }
    }
}

impl Default for PelorusConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
