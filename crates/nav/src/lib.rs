//! Navigation for PelorusCore.
//!
//! One safety decision per evaluation cycle, derived from the device's
//! heading, its obstacle list and an optional target bearing, plus a
//! deliberately simple two-waypoint path planner.

pub mod decision;
pub mod geo;
pub mod planner;

pub use decision::{DecisionEngine, DecisionKind, NavigationDecision};
pub use geo::{haversine_nm, normalize_bearing, Coordinate};
pub use planner::{plan, PlannedPath, RiskTier, REFERENCE_SPEED_KTS};
