//! Routes: named ordered waypoint sequences with speed/altitude envelopes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use pelorus_nav::Coordinate;

/// One waypoint on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Waypoint position
    pub position: Coordinate,
    /// Action to perform on arrival (e.g. "scan", "loiter")
    pub action: Option<String>,
    /// Hold time at the waypoint, in seconds
    pub hold_secs: Option<u32>,
    /// Explicit order index; waypoints are sorted by this before use
    pub order: u32,
}

impl Waypoint {
    pub fn new(position: Coordinate, order: u32) -> Self {
        Self {
            position,
            action: None,
            hold_secs: None,
            order,
        }
    }
}

/// A named route. Must contain at least one waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier
    pub route_id: String,
    /// Display name
    pub name: String,
    /// Waypoints; sorted by `order` on installation
    pub waypoints: Vec<Waypoint>,
    /// Restart at the first waypoint after the last
    pub loop_route: bool,
    /// Speed ceiling in knots
    pub max_speed_kts: f64,
    /// Altitude floor in meters
    pub min_altitude_m: f64,
    /// Altitude ceiling in meters
    pub max_altitude_m: f64,
}

impl Route {
    /// Sort waypoints by their explicit order index.
    pub fn normalize(&mut self) {
        self.waypoints.sort_by_key(|w| w.order);
    }

    /// Structural problems with this route, empty when well-formed.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.route_id.is_empty() {
            errors.push("route id must not be empty".to_string());
        }
        if self.waypoints.is_empty() {
            errors.push(format!("route '{}' has no waypoints", self.route_id));
        }
        if self.max_speed_kts <= 0.0 {
            errors.push(format!(
                "route '{}' max speed must be positive",
                self.route_id
            ));
        }
        if self.min_altitude_m > self.max_altitude_m {
            errors.push(format!(
                "route '{}' altitude floor exceeds ceiling",
                self.route_id
            ));
        }
        errors
    }
}

/// In-memory route store with device-to-route assignments.
///
/// Deletion guarding against active references lives in the registry,
/// which owns the device side of the invariant.
#[derive(Debug, Default)]
pub struct RouteStore {
    routes: HashMap<String, Route>,
    assignments: BTreeMap<String, String>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a route, normalizing waypoint order. Replaces any previous
    /// route with the same id.
    pub fn install(&mut self, mut route: Route) {
        route.normalize();
        self.routes.insert(route.route_id.clone(), route);
    }

    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.routes.get(route_id)
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.contains_key(route_id)
    }

    pub fn remove(&mut self, route_id: &str) -> Option<Route> {
        self.assignments.retain(|_, r| r != route_id);
        self.routes.remove(route_id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Record a device → route assignment.
    pub fn assign(&mut self, device_id: impl Into<String>, route_id: impl Into<String>) {
        self.assignments.insert(device_id.into(), route_id.into());
    }

    /// Route assigned to a device, if any.
    pub fn assigned_route(&self, device_id: &str) -> Option<&str> {
        self.assignments.get(device_id).map(String::as_str)
    }

    /// Drop a device's assignment (on unregister).
    pub fn unassign(&mut self, device_id: &str) {
        self.assignments.remove(device_id);
    }
}
