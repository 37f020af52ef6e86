//! Per-device reading buffers and obstacle derivation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use pelorus_core::config::SensorConfig;

use crate::readings::{CollisionSeverity, Obstacle, ProximityZone, SensorReading};

/// Sonar returns beyond this distance are ignored for obstacle derivation.
const SONAR_RANGE: f64 = 100.0;
/// Sonar returns at or below this confidence are ignored.
const SONAR_MIN_CONFIDENCE: f64 = 0.5;
/// Proximity contacts beyond this distance are ignored.
const PROXIMITY_RANGE: f64 = 50.0;
/// Sonar contacts under this distance are critical regardless of anything else.
const CRITICAL_CONTACT_DISTANCE: f64 = 5.0;

/// A buffered reading with its ingest timestamp.
#[derive(Debug, Clone)]
struct TimedReading {
    reading: SensorReading,
    timestamp_ms: u64,
}

/// Ring buffers for one device, one per reading kind.
#[derive(Debug, Default)]
struct DeviceBuffers {
    sonar: VecDeque<TimedReading>,
    proximity: VecDeque<TimedReading>,
    collision: VecDeque<TimedReading>,
}

impl DeviceBuffers {
    fn buffer_for(&mut self, reading: &SensorReading) -> &mut VecDeque<TimedReading> {
        match reading {
            SensorReading::Sonar { .. } => &mut self.sonar,
            SensorReading::Proximity { .. } => &mut self.proximity,
            SensorReading::Collision { .. } => &mut self.collision,
        }
    }
}

/// Critical-condition status for one device.
///
/// Always returned as inspectable data, never raised as an error; this is
/// the required input feed for the safety fallback monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalReport {
    /// Device the report covers
    pub device_id: String,
    /// Critical collision readings within the configured window
    pub recent_collisions: Vec<u64>,
    /// Sonar contacts under the critical contact distance
    pub close_contacts: Vec<Obstacle>,
}

impl CriticalReport {
    /// Check whether any condition in the report demands a fallback.
    pub fn is_critical(&self) -> bool {
        !self.recent_collisions.is_empty() || !self.close_contacts.is_empty()
    }
}

/// Aggregates raw readings into per-device obstacle lists.
pub struct SensorAggregator {
    config: SensorConfig,
    buffers: HashMap<String, DeviceBuffers>,
}

impl SensorAggregator {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            config,
            buffers: HashMap::new(),
        }
    }

    /// Append one reading to the device's ring buffer for that kind.
    ///
    /// Unknown devices get a buffer on first ingest; the registry owns
    /// device existence, not this layer.
    pub fn ingest(&mut self, device_id: &str, reading: SensorReading, timestamp_ms: u64) {
        debug!(device_id, kind = reading.kind_name(), "sensor reading ingested");

        let buffers = self.buffers.entry(device_id.to_string()).or_default();
        let buffer = buffers.buffer_for(&reading);
        if buffer.len() >= self.config.reading_buffer {
            buffer.pop_front();
        }
        buffer.push_back(TimedReading {
            reading,
            timestamp_ms,
        });
    }

    /// Derive the current obstacle list for a device.
    ///
    /// Sonar returns are included only under `SONAR_RANGE` with confidence
    /// above `SONAR_MIN_CONFIDENCE`; proximity contacts only under
    /// `PROXIMITY_RANGE`, with the zone mapped to its fixed bearing.
    pub fn obstacles_for(&self, device_id: &str) -> Vec<Obstacle> {
        let Some(buffers) = self.buffers.get(device_id) else {
            return Vec::new();
        };

        let mut obstacles = Vec::new();

        for timed in &buffers.sonar {
            if let SensorReading::Sonar {
                distance,
                bearing_deg,
                confidence,
            } = &timed.reading
            {
                if *distance < SONAR_RANGE && *confidence > SONAR_MIN_CONFIDENCE {
                    obstacles.push(Obstacle::new(*distance, *bearing_deg));
                }
            }
        }

        for timed in &buffers.proximity {
            if let SensorReading::Proximity { zone, distance } = &timed.reading {
                if *distance < PROXIMITY_RANGE {
                    obstacles.push(Obstacle::new(*distance, zone.bearing_deg()));
                }
            }
        }

        obstacles
    }

    /// Report critical conditions for a device.
    ///
    /// Lists any `Critical` collision reading inside the configured window
    /// and any sonar contact under `CRITICAL_CONTACT_DISTANCE`.
    pub fn critical_conditions(&self, device_id: &str, now_ms: u64) -> CriticalReport {
        let mut report = CriticalReport {
            device_id: device_id.to_string(),
            recent_collisions: Vec::new(),
            close_contacts: Vec::new(),
        };

        let Some(buffers) = self.buffers.get(device_id) else {
            return report;
        };

        for timed in &buffers.collision {
            if let SensorReading::Collision { severity } = &timed.reading {
                let age = now_ms.saturating_sub(timed.timestamp_ms);
                if severity.is_critical() && age <= self.config.collision_window_ms {
                    report.recent_collisions.push(timed.timestamp_ms);
                }
            }
        }

        for timed in &buffers.sonar {
            if let SensorReading::Sonar {
                distance,
                bearing_deg,
                confidence,
            } = &timed.reading
            {
                if *distance < CRITICAL_CONTACT_DISTANCE && *confidence > SONAR_MIN_CONFIDENCE {
                    report
                        .close_contacts
                        .push(Obstacle::new(*distance, *bearing_deg));
                }
            }
        }

        report
    }

    /// Number of buffered readings of one kind for a device. Test hook.
    pub fn buffered(&self, device_id: &str, kind: &str) -> usize {
        let Some(buffers) = self.buffers.get(device_id) else {
            return 0;
        };
        match kind {
            "sonar" => buffers.sonar.len(),
            "proximity" => buffers.proximity.len(),
            "collision" => buffers.collision.len(),
            _ => 0,
        }
    }

    /// Drop all buffered readings for a device (on unregister).
    pub fn clear_device(&mut self, device_id: &str) {
        self.buffers.remove(device_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> SensorAggregator {
        SensorAggregator::new(SensorConfig {
            reading_buffer: 100,
            collision_window_ms: 5_000,
        })
    }

    fn sonar(distance: f64, bearing: f64, confidence: f64) -> SensorReading {
        SensorReading::Sonar {
            distance,
            bearing_deg: bearing,
            confidence,
        }
    }

    #[test]
    fn test_sonar_filters_on_range_and_confidence() {
        let mut agg = aggregator();
        agg.ingest("asv-1", sonar(40.0, 10.0, 0.9), 1_000);
        agg.ingest("asv-1", sonar(150.0, 20.0, 0.9), 1_000); // out of range
        agg.ingest("asv-1", sonar(40.0, 30.0, 0.3), 1_000); // low confidence

        let obstacles = agg.obstacles_for("asv-1");
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].bearing_deg, 10.0);
    }

    #[test]
    fn test_proximity_zone_maps_to_fixed_bearing() {
        let mut agg = aggregator();
        agg.ingest(
            "asv-1",
            SensorReading::Proximity {
                zone: ProximityZone::Port,
                distance: 20.0,
            },
            1_000,
        );
        agg.ingest(
            "asv-1",
            SensorReading::Proximity {
                zone: ProximityZone::Front,
                distance: 60.0, // out of range
            },
            1_000,
        );

        let obstacles = agg.obstacles_for("asv-1");
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].bearing_deg, 270.0);
        assert_eq!(obstacles[0].distance, 20.0);
    }

    #[test]
    fn test_ring_buffer_is_bounded() {
        let mut agg = SensorAggregator::new(SensorConfig {
            reading_buffer: 3,
            collision_window_ms: 5_000,
        });
        for i in 0..10u64 {
            agg.ingest("uav-1", sonar(40.0, i as f64, 0.9), 1_000 + i);
        }
        assert_eq!(agg.buffered("uav-1", "sonar"), 3);

        // Oldest bearings were evicted
        let obstacles = agg.obstacles_for("uav-1");
        assert_eq!(obstacles[0].bearing_deg, 7.0);
    }

    #[test]
    fn test_critical_collision_within_window() {
        let mut agg = aggregator();
        agg.ingest(
            "uav-1",
            SensorReading::Collision {
                severity: CollisionSeverity::Critical,
            },
            10_000,
        );
        agg.ingest(
            "uav-1",
            SensorReading::Collision {
                severity: CollisionSeverity::Warning,
            },
            12_000,
        );

        let report = agg.critical_conditions("uav-1", 12_000);
        assert!(report.is_critical());
        assert_eq!(report.recent_collisions, vec![10_000]);

        // Same reading outside the 5s window is no longer actionable
        let report = agg.critical_conditions("uav-1", 16_000);
        assert!(!report.is_critical());
    }

    #[test]
    fn test_close_sonar_contact_is_critical() {
        let mut agg = aggregator();
        agg.ingest("asv-1", sonar(3.0, 45.0, 0.95), 1_000);

        let report = agg.critical_conditions("asv-1", 1_000);
        assert!(report.is_critical());
        assert_eq!(report.close_contacts.len(), 1);
        assert_eq!(report.close_contacts[0].distance, 3.0);
    }

    #[test]
    fn test_unknown_device_yields_empty() {
        let agg = aggregator();
        assert!(agg.obstacles_for("ghost").is_empty());
        assert!(!agg.critical_conditions("ghost", 0).is_critical());
    }

    #[test]
    fn test_clear_device() {
        let mut agg = aggregator();
        agg.ingest("asv-1", sonar(40.0, 10.0, 0.9), 1_000);
        agg.clear_device("asv-1");
        assert!(agg.obstacles_for("asv-1").is_empty());
    }
}
