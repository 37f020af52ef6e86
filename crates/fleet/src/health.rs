//! Advisory health sweep.
//!
//! Low battery, weak signal and stale telemetry are advisories: returned
//! as inspectable status for the safety monitor and dashboards, never
//! raised as errors.

use serde::{Deserialize, Serialize};

use pelorus_core::config::FleetConfig;

use crate::device::Device;

/// One non-fatal advisory condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "advisory", rename_all = "snake_case")]
pub enum Advisory {
    /// Battery below the configured threshold
    LowBattery {
        /// Current battery percentage
        percent: f64,
    },
    /// Link signal below the configured threshold
    WeakSignal {
        /// Current signal percentage
        percent: f64,
    },
    /// No telemetry for longer than the configured window
    StaleTelemetry {
        /// Age of the last update, in milliseconds
        age_ms: u64,
    },
}

/// Advisory bound to the device it was observed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAdvisory {
    /// Device the advisory applies to
    pub device_id: String,
    /// The condition observed
    pub advisory: Advisory,
}

/// Sweep one device for advisory conditions.
pub fn sweep_device(device: &Device, config: &FleetConfig, now_ms: u64) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if device.battery_percent < config.low_battery_percent {
        advisories.push(Advisory::LowBattery {
            percent: device.battery_percent,
        });
    }
    if device.signal_percent < config.weak_signal_percent {
        advisories.push(Advisory::WeakSignal {
            percent: device.signal_percent,
        });
    }

    let age_ms = now_ms.saturating_sub(device.last_update_ms);
    if age_ms > config.stale_telemetry_ms {
        advisories.push(Advisory::StaleTelemetry { age_ms });
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceKind, DeviceSpec};
    use pelorus_core::PelorusConfig;

    fn config() -> FleetConfig {
        PelorusConfig::default_config().fleet
    }

    #[test]
    fn test_healthy_device_has_no_advisories() {
        let device = DeviceSpec::new("asv-1", DeviceKind::Surface, 36.8, -76.0).into_device(1_000);
        assert!(sweep_device(&device, &config(), 1_000).is_empty());
    }

    #[test]
    fn test_low_battery_and_weak_signal() {
        let mut device =
            DeviceSpec::new("uav-1", DeviceKind::Aerial, 36.8, -76.0).into_device(1_000);
        device.battery_percent = 15.0;
        device.signal_percent = 10.0;

        let advisories = sweep_device(&device, &config(), 1_000);
        assert_eq!(advisories.len(), 2);
        assert!(advisories.contains(&Advisory::LowBattery { percent: 15.0 }));
        assert!(advisories.contains(&Advisory::WeakSignal { percent: 10.0 }));
    }

    #[test]
    fn test_stale_telemetry_after_window() {
        let device = DeviceSpec::new("asv-1", DeviceKind::Surface, 36.8, -76.0).into_device(1_000);

        // Exactly at the window edge: still fresh
        let at_edge = sweep_device(&device, &config(), 1_000 + 60_000);
        assert!(at_edge.is_empty());

        let past_edge = sweep_device(&device, &config(), 1_000 + 60_001);
        assert_eq!(
            past_edge,
            vec![Advisory::StaleTelemetry { age_ms: 60_001 }]
        );
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let mut device =
            DeviceSpec::new("uav-1", DeviceKind::Aerial, 36.8, -76.0).into_device(1_000);
        device.battery_percent = 20.0;
        device.signal_percent = 30.0;

        // At the threshold is not below it
        assert!(sweep_device(&device, &config(), 1_000).is_empty());
    }
}
