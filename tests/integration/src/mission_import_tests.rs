//! Mission document import feeding route-following devices.

use std::collections::BTreeMap;

use crate::test_utils::{fast_fleet_config, patrol_route, surface};
use pelorus_fleet::{
    mission::{MissionDocument, MissionMetadata, MissionSafetyConfig},
    CommandKind, DeviceStatus, FleetError, FleetRegistry,
};

fn document(routes: Vec<pelorus_fleet::Route>) -> MissionDocument {
    MissionDocument {
        metadata: MissionMetadata {
            id: "harbor-sweep".to_string(),
            name: "Harbor Sweep".to_string(),
            author: "ops".to_string(),
            created_at: "2024-06-10T06:00:00Z".to_string(),
            version: "2".to_string(),
            tags: vec!["survey".to_string()],
        },
        config: MissionSafetyConfig {
            max_flight_secs: 1_800,
            return_home_on_low_battery: true,
            low_battery_threshold: 25.0,
            auto_land: true,
            emergency_procedure: "return_home".to_string(),
        },
        routes,
        assignments: BTreeMap::from([("asv-1".to_string(), "patrol-east".to_string())]),
    }
}

#[tokio::test]
async fn imported_route_drives_follow_route() {
    let registry = FleetRegistry::new(fast_fleet_config());
    registry.register(surface("asv-1")).await.unwrap();

    let summary = registry
        .import_mission(document(vec![patrol_route("patrol-east")]))
        .unwrap();
    assert_eq!(summary.routes_loaded, 1);
    assert_eq!(summary.assignments, 1);

    // The dashboard resolves the assignment and dispatches follow_route
    let route_id = registry.assigned_route("asv-1").unwrap();
    let ticket = registry
        .send_command("asv-1", CommandKind::FollowRoute { route_id })
        .await
        .unwrap();
    ticket.completion.await.unwrap();

    let device = registry.device("asv-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Navigating);

    // The active reference protects the route from deletion
    let err = registry.delete_route("patrol-east").await.unwrap_err();
    assert!(matches!(err, FleetError::RouteInUse { .. }));
}

#[tokio::test]
async fn invalid_document_installs_nothing() {
    let registry = FleetRegistry::new(fast_fleet_config());

    let mut empty_route = patrol_route("patrol-east");
    empty_route.waypoints.clear();
    let good_route = patrol_route("patrol-west");

    let report = registry
        .import_mission(document(vec![empty_route, good_route]))
        .unwrap_err();
    assert!(!report.is_ok());
    assert!(report.errors.iter().any(|e| e.contains("no waypoints")));

    // Atomic rejection: the well-formed route was not partially applied
    assert_eq!(registry.route_count(), 0);
    assert_eq!(registry.assigned_route("asv-1"), None);
}

#[tokio::test]
async fn waypoints_are_ordered_after_import() {
    let registry = FleetRegistry::new(fast_fleet_config());

    let mut route = patrol_route("patrol-east");
    route.waypoints.reverse();
    registry
        .import_mission(document(vec![route]))
        .unwrap();

    let installed = registry.route("patrol-east").unwrap();
    let orders: Vec<u32> = installed.waypoints.iter().map(|w| w.order).collect();
    assert_eq!(orders, vec![1, 2]);
}
