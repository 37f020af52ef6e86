//! Telemetry ingestion: partial, idempotent, last-write-wins.

use serde::{Deserialize, Serialize};

use crate::device::Device;

/// A partial position/status update for one device.
///
/// Absent fields leave the device's current value untouched; applying the
/// same update twice is a no-op apart from the freshness timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub heading_deg: Option<f64>,
    pub speed_kts: Option<f64>,
    pub altitude_m: Option<f64>,
    pub battery_percent: Option<f64>,
    pub signal_percent: Option<f64>,
}

impl TelemetryUpdate {
    /// Apply this update to a device, always refreshing `last_update_ms`.
    pub fn apply_to(&self, device: &mut Device, timestamp_ms: u64) {
        if let Some(lat) = self.lat {
            device.lat = lat;
        }
        if let Some(lon) = self.lon {
            device.lon = lon;
        }
        if let Some(heading) = self.heading_deg {
            device.heading_deg = heading;
        }
        if let Some(speed) = self.speed_kts {
            device.speed_kts = speed;
        }
        if let Some(alt) = self.altitude_m {
            device.altitude_m = Some(alt);
        }
        if let Some(battery) = self.battery_percent {
            device.battery_percent = battery.clamp(0.0, 100.0);
        }
        if let Some(signal) = self.signal_percent {
            device.signal_percent = signal.clamp(0.0, 100.0);
        }
        device.last_update_ms = timestamp_ms;
    }
}
