//! Mission document import.
//!
//! Validation is structural and field-type only; every problem is
//! aggregated into one report and routes are installed only after the
//! whole document validates. A rejected document changes nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::routes::Route;

/// Mission document metadata block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionMetadata {
    /// Unique mission identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Author
    pub author: String,
    /// Creation timestamp (ISO-8601 string, opaque to the core)
    pub created_at: String,
    /// Document format version
    pub version: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Mission safety configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSafetyConfig {
    /// Maximum flight time in seconds
    pub max_flight_secs: u64,
    /// Return home automatically when the battery threshold is crossed
    pub return_home_on_low_battery: bool,
    /// Battery percentage that counts as low
    pub low_battery_threshold: f64,
    /// Land automatically at mission end
    pub auto_land: bool,
    /// Named emergency procedure (opaque to the core)
    pub emergency_procedure: String,
}

/// A structured mission import document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionDocument {
    pub metadata: MissionMetadata,
    pub config: MissionSafetyConfig,
    /// Routes to install
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Device id to route id assignments
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
}

/// Aggregated validation outcome: the caller sees every problem in one
/// round-trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Problems that reject the document
    pub errors: Vec<String>,
    /// Non-fatal observations
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Check if the document passed validation
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )?;
        for e in &self.errors {
            write!(f, "\n  error: {e}")?;
        }
        for w in &self.warnings {
            write!(f, "\n  warning: {w}")?;
        }
        Ok(())
    }
}

/// Result summary of a successful import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSummary {
    /// Mission identifier from the document metadata
    pub mission_id: String,
    /// Number of routes installed
    pub routes_loaded: usize,
    /// Number of device assignments recorded
    pub assignments: usize,
    /// Warnings carried over from validation
    pub warnings: Vec<String>,
}

impl MissionDocument {
    /// Validate the whole document structurally.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.metadata.id.is_empty() {
            report.errors.push("mission id must not be empty".to_string());
        }
        if self.metadata.name.is_empty() {
            report
                .errors
                .push("mission name must not be empty".to_string());
        }
        if self.metadata.version.is_empty() {
            report
                .warnings
                .push("mission version is empty".to_string());
        }

        if self.config.max_flight_secs == 0 {
            report
                .errors
                .push("max flight time must be positive".to_string());
        }
        if !(0.0..=100.0).contains(&self.config.low_battery_threshold) {
            report.errors.push(format!(
                "low battery threshold {} outside 0-100",
                self.config.low_battery_threshold
            ));
        }

        if self.routes.is_empty() {
            report
                .warnings
                .push("mission document contains no routes".to_string());
        }

        let mut seen = HashSet::new();
        for route in &self.routes {
            report.errors.extend(route.validate());
            if !seen.insert(route.route_id.as_str()) {
                report
                    .errors
                    .push(format!("duplicate route id '{}'", route.route_id));
            }

            let mut orders = HashSet::new();
            for waypoint in &route.waypoints {
                if !orders.insert(waypoint.order) {
                    report.warnings.push(format!(
                        "route '{}' has duplicate waypoint order {}",
                        route.route_id, waypoint.order
                    ));
                }
            }
        }

        for (device_id, route_id) in &self.assignments {
            if device_id.is_empty() {
                report
                    .errors
                    .push("assignment with empty device id".to_string());
            }
            if !self.routes.iter().any(|r| &r.route_id == route_id) {
                report.errors.push(format!(
                    "assignment for '{device_id}' references unknown route '{route_id}'"
                ));
            }
        }

        report
    }
}
