//! End-to-end command lifecycle flows across the registry boundary.

use crate::test_utils::{aerial, fast_fleet_config, surface};
use pelorus_fleet::{
    CommandKind, CommandStatus, DeviceStatus, FleetError, FleetRegistry, TelemetryUpdate,
};

#[tokio::test]
async fn takeoff_then_land_round_trip() {
    let registry = FleetRegistry::new(fast_fleet_config());
    registry.register(aerial("uav-1")).await.unwrap();

    let takeoff = registry
        .send_command("uav-1", CommandKind::Takeoff { altitude_m: None })
        .await
        .unwrap();

    // Acknowledgement precedes execution: the command is not yet terminal
    let pending = registry.command_status(&takeoff.command_id).unwrap();
    assert!(!pending.status.is_terminal());

    let done = takeoff.completion.await.unwrap();
    assert_eq!(done.status, CommandStatus::Completed);
    assert_eq!(
        registry.device("uav-1").await.unwrap().status,
        DeviceStatus::Flying
    );

    let land = registry.send_command("uav-1", CommandKind::Land).await.unwrap();
    land.completion.await.unwrap();

    let device = registry.device("uav-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Idle);
    assert_eq!(device.altitude_m, Some(0.0));
}

#[tokio::test]
async fn concurrent_commands_on_distinct_devices_do_not_interfere() {
    let registry = FleetRegistry::new(fast_fleet_config());
    registry.register(aerial("uav-1")).await.unwrap();
    registry.register(surface("asv-1")).await.unwrap();

    let t1 = registry
        .send_command("uav-1", CommandKind::Takeoff { altitude_m: None })
        .await
        .unwrap();
    let t2 = registry
        .send_command("asv-1", CommandKind::Hover { duration_secs: None })
        .await
        .unwrap();

    let (r1, r2) = tokio::join!(t1.completion, t2.completion);
    assert_eq!(r1.unwrap().status, CommandStatus::Completed);
    assert_eq!(r2.unwrap().status, CommandStatus::Completed);

    assert_eq!(
        registry.device("uav-1").await.unwrap().status,
        DeviceStatus::Flying
    );
    assert_eq!(
        registry.device("asv-1").await.unwrap().status,
        DeviceStatus::Holding
    );
}

#[tokio::test]
async fn emergency_stop_overrides_in_flight_execution() {
    let mut config = fast_fleet_config();
    config.command_settle_ms = 150;
    let registry = FleetRegistry::new(config);
    registry.register(surface("asv-1")).await.unwrap();

    let transit = registry
        .send_command(
            "asv-1",
            CommandKind::Goto {
                target: pelorus_nav::Coordinate::new(37.0, -76.0),
            },
        )
        .await
        .unwrap();

    let stop = registry
        .send_command(
            "asv-1",
            CommandKind::EmergencyStop {
                reason: "collision alarm".to_string(),
            },
        )
        .await
        .unwrap();
    stop.completion.await.unwrap();

    let preempted = transit.completion.await.unwrap();
    assert_eq!(preempted.status, CommandStatus::Failed);

    let device = registry.device("asv-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Emergency);
    assert_eq!(device.speed_kts, 0.0);
    // The goto must not have applied its position overwrite
    assert_eq!(device.lat, 36.85);
}

#[tokio::test]
async fn offline_device_rejects_commands_until_telemetry_restores_nothing() {
    let registry = FleetRegistry::new(fast_fleet_config());
    registry.register(surface("asv-1")).await.unwrap();
    registry.mark_offline("asv-1").await.unwrap();

    let err = registry
        .send_command("asv-1", CommandKind::Hover { duration_secs: None })
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::DeviceOffline(_)));

    // Telemetry still lands (idempotent last-write-wins) and refreshes freshness
    let before = registry.device("asv-1").await.unwrap().last_update_ms;
    let after = registry
        .apply_telemetry(
            "asv-1",
            TelemetryUpdate {
                battery_percent: Some(55.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(after.last_update_ms >= before);
    assert_eq!(after.battery_percent, 55.0);
}
