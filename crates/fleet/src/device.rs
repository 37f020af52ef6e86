//! Device and navigation-state domain models.

use serde::{Deserialize, Serialize};

use pelorus_nav::Coordinate;

/// Device kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Aerial drone
    Aerial,
    /// Autonomous surface vehicle
    Surface,
}

/// Device lifecycle status.
///
/// Covers both the coarse lifecycle and the in-flight phases the command
/// executor transitions through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    /// Registered, on deck or moored
    Idle,
    /// Takeoff in progress
    Takeoff,
    /// Airborne / underway
    Flying,
    /// Station-keeping in the air
    Hovering,
    /// Landing in progress
    Landing,
    /// Following an installed route
    Navigating,
    /// Station-keeping on the surface
    Holding,
    /// Emergency stop applied
    Emergency,
    /// Unreachable; rejects commands
    Offline,
}

impl DeviceStatus {
    /// Check if the device is reachable for commanding
    pub fn is_commandable(&self) -> bool {
        !matches!(self, DeviceStatus::Offline)
    }
}

/// Navigation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavMode {
    /// Operator-steered
    Manual,
    /// Self-steering toward a target
    Autonomous,
    /// Following an installed route waypoint by waypoint
    WaypointFollow,
    /// Keeping station
    HoldPosition,
    /// Emergency stop applied
    Emergency,
}

/// Navigation state owned exclusively by its device.
///
/// Mutated only by the command executor or the safety fallback monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Current mode
    pub mode: NavMode,
    /// Target position, when steering toward one
    pub target: Option<Coordinate>,
    /// Index of the current waypoint on the active route
    pub waypoint_index: Option<usize>,
    /// Route the device is actively following
    pub active_route: Option<String>,
    /// Obstacle currently detected on the latest evaluation cycle
    pub obstacle_detected: bool,
    /// Autonomy level, 0 (fully manual) to 100 (fully autonomous)
    pub autonomy_level: u8,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            mode: NavMode::Manual,
            target: None,
            waypoint_index: None,
            active_route: None,
            obstacle_detected: false,
            autonomy_level: 0,
        }
    }
}

/// A registered device with its last known kinematic state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Unique device identifier
    pub device_id: String,
    /// Device kind
    pub kind: DeviceKind,
    /// Lifecycle status
    pub status: DeviceStatus,
    /// Current latitude
    pub lat: f64,
    /// Current longitude
    pub lon: f64,
    /// Heading in degrees
    pub heading_deg: f64,
    /// Speed in knots
    pub speed_kts: f64,
    /// Altitude in meters (aerial devices)
    pub altitude_m: Option<f64>,
    /// Battery percentage (0-100)
    pub battery_percent: f64,
    /// Link signal percentage (0-100)
    pub signal_percent: f64,
    /// Registration timestamp (Unix epoch milliseconds)
    pub registered_at_ms: u64,
    /// Timestamp of last update (Unix epoch milliseconds)
    pub last_update_ms: u64,
}

impl Device {
    /// Check whether a device status and navigation state are mutually
    /// consistent: `Emergency` status requires `Emergency` mode and zero
    /// speed, and vice versa.
    pub fn consistent_with(&self, nav: &NavigationState) -> bool {
        match (self.status, nav.mode) {
            (DeviceStatus::Emergency, NavMode::Emergency) => self.speed_kts == 0.0,
            (DeviceStatus::Emergency, _) | (_, NavMode::Emergency) => false,
            _ => true,
        }
    }
}

/// Registration input for a new device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Unique device identifier
    pub device_id: String,
    /// Device kind
    pub kind: DeviceKind,
    /// Initial latitude
    pub lat: f64,
    /// Initial longitude
    pub lon: f64,
}

impl DeviceSpec {
    pub fn new(device_id: impl Into<String>, kind: DeviceKind, lat: f64, lon: f64) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            lat,
            lon,
        }
    }

    /// Materialize the spec into an idle device.
    pub fn into_device(self, timestamp_ms: u64) -> Device {
        Device {
            device_id: self.device_id,
            kind: self.kind,
            status: DeviceStatus::Idle,
            lat: self.lat,
            lon: self.lon,
            heading_deg: 0.0,
            speed_kts: 0.0,
            altitude_m: match self.kind {
                DeviceKind::Aerial => Some(0.0),
                DeviceKind::Surface => None,
            },
            battery_percent: 100.0,
            signal_percent: 100.0,
            registered_at_ms: timestamp_ms,
            last_update_ms: timestamp_ms,
        }
    }
}
