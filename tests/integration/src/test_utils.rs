//! Shared helpers for the integration suite.

use pelorus_core::config::{FleetConfig, PelorusConfig};
use pelorus_fleet::{DeviceKind, DeviceSpec, Route, Waypoint};
use pelorus_nav::Coordinate;

/// Default config with settle delays and windows tightened for tests.
pub fn fast_config() -> PelorusConfig {
    let mut config = PelorusConfig::default_config();
    config.fleet.takeoff_settle_ms = 10;
    config.fleet.land_settle_ms = 10;
    config.fleet.command_settle_ms = 10;
    config.coordination.agent_restart_ms = 20;
    config
}

/// Fleet slice of the fast config.
pub fn fast_fleet_config() -> FleetConfig {
    fast_config().fleet
}

pub fn aerial(id: &str) -> DeviceSpec {
    DeviceSpec::new(id, DeviceKind::Aerial, 36.85, -76.29)
}

pub fn surface(id: &str) -> DeviceSpec {
    DeviceSpec::new(id, DeviceKind::Surface, 36.85, -76.29)
}

/// A two-leg harbor patrol route.
pub fn patrol_route(id: &str) -> Route {
    Route {
        route_id: id.to_string(),
        name: format!("Patrol {id}"),
        waypoints: vec![
            Waypoint::new(Coordinate::new(36.90, -76.25), 1),
            Waypoint::new(Coordinate::new(36.95, -76.20), 2),
        ],
        loop_route: true,
        max_speed_kts: 12.0,
        min_altitude_m: 0.0,
        max_altitude_m: 120.0,
    }
}
