//! Two-waypoint path planner.
//!
//! Intentionally simple: a direct leg from start to end annotated with
//! great-circle distance, a transit estimate at a fixed reference speed and
//! a risk tier from the obstacle count. Multi-waypoint optimization layers
//! on top without changing this contract.

use serde::{Deserialize, Serialize};

use pelorus_sensors::Obstacle;

use crate::geo::{haversine_nm, Coordinate};

/// Fixed reference speed used for transit estimates, in knots.
pub const REFERENCE_SPEED_KTS: f64 = 10.0;

/// Risk classification for a planned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Fewer than 6 obstacles on the current picture
    Low,
    /// 6 to 10 obstacles
    Medium,
    /// More than 10 obstacles
    High,
}

impl RiskTier {
    fn from_obstacle_count(count: usize) -> Self {
        if count < 6 {
            RiskTier::Low
        } else if count <= 10 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }
}

/// A planned path between two positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedPath {
    /// Waypoints, start first
    pub waypoints: Vec<Coordinate>,
    /// Great-circle distance in nautical miles
    pub distance_nm: f64,
    /// Estimated transit time at the reference speed, in hours
    pub transit_hours: f64,
    /// Risk tier from the obstacle picture at planning time
    pub risk: RiskTier,
}

/// Plan a direct path from `start` to `end` given the current obstacle picture.
pub fn plan(start: Coordinate, end: Coordinate, obstacles: &[Obstacle]) -> PlannedPath {
    let distance_nm = haversine_nm(&start, &end);
    PlannedPath {
        waypoints: vec![start, end],
        distance_nm,
        transit_hours: distance_nm / REFERENCE_SPEED_KTS,
        risk: RiskTier::from_obstacle_count(obstacles.len()),
    }
}
