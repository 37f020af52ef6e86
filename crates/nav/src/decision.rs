//! Navigation decision engine.
//!
//! Emits exactly one safety decision per evaluation cycle from the device
//! heading, the current obstacle list and an optional target bearing. The
//! engine never raises an error: an unknown device yields a deterministic
//! stop with zero confidence.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use pelorus_core::config::NavConfig;
use pelorus_sensors::Obstacle;

use crate::geo::normalize_bearing;

/// Bearing deltas under this magnitude count as on-course.
const ON_COURSE_DEG: f64 = 5.0;
/// Fraction of the safety distance at which an obstacle forces a stop.
const STOP_FRACTION: f64 = 0.3;

/// One navigation decision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Hold course and speed
    Continue,
    /// Alter course to port
    TurnLeft,
    /// Alter course to starboard
    TurnRight,
    /// Stop and hold
    Stop,
    /// Back away from the contact
    Reverse,
    /// Keep station at the current position
    HoldPosition,
}

/// Decision emitted by one evaluation cycle. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationDecision {
    /// Evaluation timestamp (Unix epoch milliseconds)
    pub timestamp_ms: u64,
    /// Decision value
    pub decision: DecisionKind,
    /// Human-readable reason
    pub reason: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Ranked alternatives not taken
    pub alternatives: Vec<DecisionKind>,
}

/// Decision engine with per-device bounded history.
pub struct DecisionEngine {
    config: NavConfig,
    history: HashMap<String, VecDeque<NavigationDecision>>,
}

impl DecisionEngine {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
        }
    }

    /// Evaluate one cycle for a known device.
    ///
    /// Pure in its inputs apart from the history append; safe to call
    /// concurrently across devices as long as a single device's calls are
    /// serialized by the owner.
    pub fn decide(
        &mut self,
        device_id: &str,
        heading_deg: f64,
        obstacles: &[Obstacle],
        target_bearing: Option<f64>,
        timestamp_ms: u64,
    ) -> NavigationDecision {
        let decision = self.evaluate(heading_deg, obstacles, target_bearing, timestamp_ms);
        debug!(
            device_id,
            decision = ?decision.decision,
            confidence = decision.confidence,
            "navigation decision"
        );
        self.record(device_id, decision.clone());
        decision
    }

    /// Deterministic output for a device the caller could not resolve.
    pub fn decide_unknown(&mut self, device_id: &str, timestamp_ms: u64) -> NavigationDecision {
        let decision = NavigationDecision {
            timestamp_ms,
            decision: DecisionKind::Stop,
            reason: "device not found".to_string(),
            confidence: 0.0,
            alternatives: Vec::new(),
        };
        self.record(device_id, decision.clone());
        decision
    }

    /// Decision history for a device, oldest first.
    pub fn history(&self, device_id: &str) -> Vec<NavigationDecision> {
        self.history
            .get(device_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop a device's decision history (on unregister).
    pub fn clear_device(&mut self, device_id: &str) {
        self.history.remove(device_id);
    }

    fn record(&mut self, device_id: &str, decision: NavigationDecision) {
        let history = self.history.entry(device_id.to_string()).or_default();
        if history.len() >= self.config.decision_history {
            history.pop_front();
        }
        history.push_back(decision);
    }

    fn evaluate(
        &self,
        heading_deg: f64,
        obstacles: &[Obstacle],
        target_bearing: Option<f64>,
        timestamp_ms: u64,
    ) -> NavigationDecision {
        let safety = self.config.safety_distance;
        let in_range: Vec<&Obstacle> = obstacles.iter().filter(|o| o.distance < safety).collect();

        let raw = if in_range.is_empty() {
            self.clear_water(heading_deg, target_bearing, timestamp_ms)
        } else {
            self.avoid(heading_deg, &in_range, target_bearing, timestamp_ms)
        };

        self.scale_risk(raw)
    }

    /// No obstacle inside the safety distance: steer to the target if one
    /// is set, otherwise hold course.
    fn clear_water(
        &self,
        heading_deg: f64,
        target_bearing: Option<f64>,
        timestamp_ms: u64,
    ) -> NavigationDecision {
        match target_bearing {
            Some(target) => {
                let delta = normalize_bearing(target - heading_deg);
                if delta.abs() < ON_COURSE_DEG {
                    NavigationDecision {
                        timestamp_ms,
                        decision: DecisionKind::Continue,
                        reason: format!("clear water, on bearing ({delta:.1} deg off target)"),
                        confidence: 0.95,
                        alternatives: Vec::new(),
                    }
                } else if delta > 0.0 {
                    NavigationDecision {
                        timestamp_ms,
                        decision: DecisionKind::TurnRight,
                        reason: format!("clear water, target {delta:.1} deg to starboard"),
                        confidence: 0.90,
                        alternatives: vec![DecisionKind::Continue],
                    }
                } else {
                    NavigationDecision {
                        timestamp_ms,
                        decision: DecisionKind::TurnLeft,
                        reason: format!("clear water, target {:.1} deg to port", -delta),
                        confidence: 0.90,
                        alternatives: vec![DecisionKind::Continue],
                    }
                }
            }
            None => NavigationDecision {
                timestamp_ms,
                decision: DecisionKind::Continue,
                reason: "clear water, no target set".to_string(),
                confidence: 0.85,
                alternatives: vec![
                    DecisionKind::HoldPosition,
                    DecisionKind::TurnLeft,
                    DecisionKind::TurnRight,
                ],
            },
        }
    }

    /// At least one obstacle inside the safety distance.
    fn avoid(
        &self,
        heading_deg: f64,
        in_range: &[&Obstacle],
        target_bearing: Option<f64>,
        timestamp_ms: u64,
    ) -> NavigationDecision {
        let closest = in_range
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .expect("in_range is non-empty");

        // Hard stop inside the close-in threshold, regardless of target.
        if closest.distance < self.config.safety_distance * STOP_FRACTION {
            return NavigationDecision {
                timestamp_ms,
                decision: DecisionKind::Stop,
                reason: format!("contact at {:.1} units, inside stop threshold", closest.distance),
                confidence: 1.0,
                alternatives: vec![DecisionKind::Reverse],
            };
        }

        // Arc occupancy relative to the current heading.
        let mut left_occupied = false;
        let mut right_occupied = false;
        for obstacle in in_range {
            let rel = normalize_bearing(obstacle.bearing_deg - heading_deg);
            if rel > -90.0 && rel < -10.0 {
                left_occupied = true;
            } else if rel > 10.0 && rel < 90.0 {
                right_occupied = true;
            }
        }

        match (left_occupied, right_occupied) {
            (true, false) => NavigationDecision {
                timestamp_ms,
                decision: DecisionKind::TurnRight,
                reason: "port arc blocked, starboard clear".to_string(),
                confidence: 0.85,
                alternatives: vec![DecisionKind::Stop, DecisionKind::Reverse],
            },
            (false, true) => NavigationDecision {
                timestamp_ms,
                decision: DecisionKind::TurnLeft,
                reason: "starboard arc blocked, port clear".to_string(),
                confidence: 0.85,
                alternatives: vec![DecisionKind::Stop, DecisionKind::Reverse],
            },
            (false, false) => {
                // Contact ahead or astern but both turn arcs open.
                match target_bearing {
                    Some(target) => {
                        let delta = normalize_bearing(target - heading_deg);
                        let decision = if delta >= 0.0 {
                            DecisionKind::TurnRight
                        } else {
                            DecisionKind::TurnLeft
                        };
                        NavigationDecision {
                            timestamp_ms,
                            decision,
                            reason: "both arcs clear, turning toward target".to_string(),
                            confidence: 0.80,
                            alternatives: vec![DecisionKind::Stop, DecisionKind::Reverse],
                        }
                    }
                    None => NavigationDecision {
                        timestamp_ms,
                        decision: DecisionKind::TurnRight,
                        reason: "both arcs clear, no target, defaulting starboard".to_string(),
                        confidence: 0.75,
                        alternatives: vec![DecisionKind::Stop, DecisionKind::Reverse],
                    },
                }
            }
            (true, true) => NavigationDecision {
                timestamp_ms,
                decision: DecisionKind::Stop,
                reason: "both arcs blocked".to_string(),
                confidence: 0.90,
                alternatives: vec![DecisionKind::Reverse],
            },
        }
    }

    fn scale_risk(&self, mut decision: NavigationDecision) -> NavigationDecision {
        let factor = 1.0 - self.config.risk_tolerance * 0.2;
        decision.confidence = (decision.confidence * factor).clamp(0.0, 1.0);
        decision
    }
}
