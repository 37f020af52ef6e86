//! Safety fallback precedence on telemetry loss and critical faults.

use crate::test_utils::{aerial, fast_config, surface};
use pelorus_fleet::{Advisory, DeviceKind, DeviceStatus, FleetRegistry, NavMode};
use pelorus_safety::{FallbackAction, FallbackMonitor, FallbackReason};
use pelorus_sensors::{CollisionSeverity, SensorAggregator, SensorReading};

#[tokio::test]
async fn stale_telemetry_advisory_feeds_an_aerial_land_fallback() {
    let config = fast_config();
    let registry = FleetRegistry::new(config.fleet.clone());
    let monitor = FallbackMonitor::new();

    let device = registry.register(aerial("uav-1")).await.unwrap();
    let takeoff = registry
        .send_command(
            "uav-1",
            pelorus_fleet::CommandKind::Takeoff { altitude_m: None },
        )
        .await
        .unwrap();
    takeoff.completion.await.unwrap();

    // Health sweep after the stale window surfaces the advisory, never an error
    let later = device.registered_at_ms + 120_000;
    let report = registry.health_report(later).await;
    let stale = report
        .iter()
        .find(|a| matches!(a.advisory, Advisory::StaleTelemetry { .. }))
        .expect("stale advisory expected");
    assert_eq!(stale.device_id, "uav-1");

    // The caller reacts by triggering the fallback and applying its command
    // before any further decision-engine output
    let record = monitor.trigger("uav-1", DeviceKind::Aerial, FallbackReason::TelemetryLost, later);
    assert_eq!(record.action, FallbackAction::Land);

    let ticket = registry
        .send_command("uav-1", record.action.as_command())
        .await
        .unwrap();
    ticket.completion.await.unwrap();

    let device = registry.device("uav-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Idle);
    assert_eq!(device.altitude_m, Some(0.0));
    assert_eq!(monitor.history_for("uav-1").len(), 1);
}

#[tokio::test]
async fn critical_sensor_condition_holds_a_surface_vehicle() {
    let config = fast_config();
    let registry = FleetRegistry::new(config.fleet.clone());
    let mut sensors = SensorAggregator::new(config.sensors.clone());
    let monitor = FallbackMonitor::new();

    registry.register(surface("asv-1")).await.unwrap();

    sensors.ingest(
        "asv-1",
        SensorReading::Collision {
            severity: CollisionSeverity::Critical,
        },
        10_000,
    );
    let report = sensors.critical_conditions("asv-1", 11_000);
    assert!(report.is_critical());

    let record = monitor.trigger(
        "asv-1",
        DeviceKind::Surface,
        FallbackReason::CriticalSensor,
        11_000,
    );
    assert_eq!(record.action, FallbackAction::HoldPosition);

    let ticket = registry
        .send_command("asv-1", record.action.as_command())
        .await
        .unwrap();
    ticket.completion.await.unwrap();

    let device = registry.device("asv-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Holding);
    let nav = registry.navigation("asv-1").await.unwrap();
    assert_eq!(nav.mode, NavMode::HoldPosition);
}

#[test]
fn fallback_mapping_is_deterministic() {
    let monitor = FallbackMonitor::new();
    for i in 0..5u64 {
        let record = monitor.trigger(
            "uav-1",
            DeviceKind::Aerial,
            FallbackReason::TelemetryLost,
            i,
        );
        assert_eq!(record.action, FallbackAction::Land);
    }
    for i in 0..5u64 {
        let record = monitor.trigger(
            "asv-1",
            DeviceKind::Surface,
            FallbackReason::TelemetryLost,
            i,
        );
        assert_eq!(record.action, FallbackAction::HoldPosition);
    }
    assert_eq!(monitor.history().len(), 10);
}
