//! Sensors → decision engine → fleet command pipeline.

use crate::test_utils::{fast_config, surface};
use pelorus_fleet::{CommandKind, DeviceStatus, FleetRegistry};
use pelorus_nav::{plan, Coordinate, DecisionEngine, DecisionKind, RiskTier};
use pelorus_sensors::{CollisionSeverity, ProximityZone, SensorAggregator, SensorReading};

#[tokio::test]
async fn close_contact_drives_a_stop_through_the_fleet() {
    let config = fast_config();
    let registry = FleetRegistry::new(config.fleet.clone());
    let mut sensors = SensorAggregator::new(config.sensors.clone());
    let mut engine = DecisionEngine::new(config.nav.clone());

    registry.register(surface("asv-1")).await.unwrap();

    // A confident sonar return dead ahead at 8 units (< 30% of the 50-unit
    // safety distance)
    sensors.ingest(
        "asv-1",
        SensorReading::Sonar {
            distance: 8.0,
            bearing_deg: 0.0,
            confidence: 0.9,
        },
        1_000,
    );

    let device = registry.device("asv-1").await.unwrap();
    let obstacles = sensors.obstacles_for("asv-1");
    let decision = engine.decide("asv-1", device.heading_deg, &obstacles, None, 1_000);

    assert_eq!(decision.decision, DecisionKind::Stop);
    assert!(decision.alternatives.contains(&DecisionKind::Reverse));

    registry
        .note_obstacles("asv-1", !obstacles.is_empty())
        .await
        .unwrap();
    assert!(registry.navigation("asv-1").await.unwrap().obstacle_detected);

    // The dashboard layer applies a stop as station-keeping
    let ticket = registry
        .send_command("asv-1", CommandKind::Hover { duration_secs: None })
        .await
        .unwrap();
    ticket.completion.await.unwrap();
    assert_eq!(
        registry.device("asv-1").await.unwrap().status,
        DeviceStatus::Holding
    );
}

#[tokio::test]
async fn proximity_zones_steer_the_turn_direction() {
    let config = fast_config();
    let mut sensors = SensorAggregator::new(config.sensors.clone());
    let mut engine = DecisionEngine::new(config.nav.clone());

    // Contact in the starboard zone at 30 units; with the vessel heading
    // 020 the contact sits 70 degrees off the bow, inside the starboard arc
    sensors.ingest(
        "asv-1",
        SensorReading::Proximity {
            zone: ProximityZone::Starboard,
            distance: 30.0,
        },
        1_000,
    );

    let obstacles = sensors.obstacles_for("asv-1");
    assert_eq!(obstacles.len(), 1);
    assert_eq!(obstacles[0].bearing_deg, 90.0);

    let decision = engine.decide("asv-1", 20.0, &obstacles, None, 1_000);
    assert_eq!(decision.decision, DecisionKind::TurnLeft);
}

#[test]
fn critical_feed_and_planner_share_the_obstacle_picture() {
    let config = fast_config();
    let mut sensors = SensorAggregator::new(config.sensors.clone());

    sensors.ingest(
        "uav-1",
        SensorReading::Collision {
            severity: CollisionSeverity::Critical,
        },
        5_000,
    );
    for i in 0..7 {
        sensors.ingest(
            "uav-1",
            SensorReading::Sonar {
                distance: 40.0 + i as f64,
                bearing_deg: 10.0 * i as f64,
                confidence: 0.8,
            },
            5_000,
        );
    }

    let report = sensors.critical_conditions("uav-1", 6_000);
    assert!(report.is_critical());

    let obstacles = sensors.obstacles_for("uav-1");
    let path = plan(
        Coordinate::new(36.85, -76.29),
        Coordinate::new(36.95, -76.20),
        &obstacles,
    );
    assert_eq!(path.risk, RiskTier::Medium);
    assert!(path.distance_nm > 0.0);
    assert_eq!(path.waypoints.len(), 2);
}

#[test]
fn decision_history_accumulates_per_device() {
    let config = fast_config();
    let mut engine = DecisionEngine::new(config.nav.clone());

    engine.decide("asv-1", 0.0, &[], Some(0.0), 1_000);
    engine.decide("asv-1", 0.0, &[], None, 2_000);
    engine.decide_unknown("ghost", 3_000);

    assert_eq!(engine.history("asv-1").len(), 2);
    assert_eq!(engine.history("ghost").len(), 1);
    assert_eq!(engine.history("ghost")[0].confidence, 0.0);
}
