//! Sensor aggregation for PelorusCore.
//!
//! Normalizes heterogeneous raw readings (ranged sonar, zoned proximity,
//! binary collision) into per-device obstacle lists and a critical-condition
//! feed for the safety fallback monitor.

pub mod aggregator;
pub mod readings;

pub use aggregator::{CriticalReport, SensorAggregator};
pub use readings::{CollisionSeverity, Obstacle, ProximityZone, SensorReading};
