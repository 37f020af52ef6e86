//! Raw reading shapes and the derived obstacle type.

use serde::{Deserialize, Serialize};

/// Proximity sensor zone, mapped to a fixed bearing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityZone {
    /// Dead ahead (0 degrees)
    Front,
    /// Starboard beam (90 degrees)
    Starboard,
    /// Astern (180 degrees)
    Rear,
    /// Port beam (270 degrees)
    Port,
}

impl ProximityZone {
    /// Fixed bearing assigned to each zone.
    pub fn bearing_deg(&self) -> f64 {
        match self {
            ProximityZone::Front => 0.0,
            ProximityZone::Starboard => 90.0,
            ProximityZone::Rear => 180.0,
            ProximityZone::Port => 270.0,
        }
    }
}

/// Severity reported by a collision sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionSeverity {
    /// Informational contact
    Info,
    /// Contact requiring attention
    Warning,
    /// Contact requiring immediate safe action
    Critical,
}

impl CollisionSeverity {
    /// Check if this severity requires immediate action
    pub fn is_critical(&self) -> bool {
        matches!(self, CollisionSeverity::Critical)
    }
}

/// One raw reading from a device-mounted sensor.
///
/// The three shapes the aggregator accepts; anything richer is normalized
/// by the ingesting driver before it reaches this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorReading {
    /// Ranged return with a bearing and a detection confidence.
    Sonar {
        /// Distance to the return, in range units
        distance: f64,
        /// Absolute bearing of the return, in degrees
        bearing_deg: f64,
        /// Detection confidence in [0, 1]
        confidence: f64,
    },
    /// Zoned proximity detection.
    Proximity {
        /// Zone the contact was detected in
        zone: ProximityZone,
        /// Distance to the contact, in range units
        distance: f64,
    },
    /// Binary collision/contact event.
    Collision {
        /// Reported severity
        severity: CollisionSeverity,
    },
}

impl SensorReading {
    /// Short kind name used for logging and buffer selection.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SensorReading::Sonar { .. } => "sonar",
            SensorReading::Proximity { .. } => "proximity",
            SensorReading::Collision { .. } => "collision",
        }
    }
}

/// Derived obstacle: distance plus bearing, recomputed every evaluation
/// cycle from current readings. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Distance to the obstacle, in range units
    pub distance: f64,
    /// Absolute bearing of the obstacle, in degrees
    pub bearing_deg: f64,
}

impl Obstacle {
    pub fn new(distance: f64, bearing_deg: f64) -> Self {
        Self {
            distance,
            bearing_deg,
        }
    }
}
