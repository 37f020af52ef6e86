//! Fleet registry and asynchronous command executor.
//!
//! The registry owns the authoritative state of every registered device.
//! Commands are acknowledged synchronously and executed on spawned tasks
//! after a configured settle delay; a single device's transitions are
//! serialized behind its own lock while distinct devices proceed
//! concurrently.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{info, warn};

use pelorus_core::config::FleetConfig;
use pelorus_core::time::{next_id, now_ms};

use crate::command::{Command, CommandKind, CommandTicket};
use crate::device::{Device, DeviceKind, DeviceSpec, DeviceStatus, NavMode, NavigationState};
use crate::error::FleetError;
use crate::health::{sweep_device, DeviceAdvisory};
use crate::mission::{MissionDocument, MissionSummary, ValidationReport};
use crate::routes::{Route, RouteStore};
use crate::telemetry::TelemetryUpdate;

/// Bounded fleet-wide command history.
#[derive(Debug)]
struct CommandLog {
    order: VecDeque<String>,
    by_id: HashMap<String, Command>,
    cap: usize,
}

impl CommandLog {
    fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::new(),
            by_id: HashMap::new(),
            cap,
        }
    }

    fn push(&mut self, command: Command) {
        if self.order.len() >= self.cap {
            if let Some(evicted) = self.order.pop_front() {
                self.by_id.remove(&evicted);
            }
        }
        self.order.push_back(command.command_id.clone());
        self.by_id.insert(command.command_id.clone(), command);
    }

    fn update(&mut self, command_id: &str, f: impl FnOnce(&mut Command)) -> Option<Command> {
        let command = self.by_id.get_mut(command_id)?;
        f(command);
        Some(command.clone())
    }

    fn get(&self, command_id: &str) -> Option<Command> {
        self.by_id.get(command_id).cloned()
    }

    fn snapshot(&self) -> Vec<Command> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

/// Mutable state of one device, guarded by its own lock.
#[derive(Debug)]
struct DeviceRecord {
    device: Device,
    nav: NavigationState,
    queue: VecDeque<String>,
    /// Bumped by emergency stop; an in-flight execution that wakes to a
    /// different epoch must not apply its transition.
    preempt_epoch: u64,
}

/// Immutable handle data kept outside the per-device lock.
struct DeviceHandle {
    kind: DeviceKind,
    record: Arc<Mutex<DeviceRecord>>,
}

/// Capacity-bounded device registry with asynchronous command execution.
pub struct FleetRegistry {
    config: FleetConfig,
    devices: RwLock<HashMap<String, DeviceHandle>>,
    log: Arc<StdMutex<CommandLog>>,
    routes: StdMutex<RouteStore>,
}

impl FleetRegistry {
    pub fn new(config: FleetConfig) -> Self {
        let history = config.command_history;
        Self {
            config,
            devices: RwLock::new(HashMap::new()),
            log: Arc::new(StdMutex::new(CommandLog::new(history))),
            routes: StdMutex::new(RouteStore::new()),
        }
    }

    /// Register a device. Fails with `CapacityExceeded` or `DuplicateId`
    /// without touching existing devices.
    pub async fn register(&self, spec: DeviceSpec) -> Result<Device, FleetError> {
        let mut devices = self.devices.write().await;

        if devices.contains_key(&spec.device_id) {
            return Err(FleetError::DuplicateId(spec.device_id));
        }

        let limit = match spec.kind {
            DeviceKind::Aerial => self.config.max_aerial,
            DeviceKind::Surface => self.config.max_surface,
        };
        let count = devices.values().filter(|h| h.kind == spec.kind).count();
        if count >= limit {
            return Err(FleetError::CapacityExceeded {
                kind: spec.kind,
                limit,
            });
        }

        let device = spec.into_device(now_ms());
        info!(device_id = %device.device_id, kind = ?device.kind, "device registered");

        devices.insert(
            device.device_id.clone(),
            DeviceHandle {
                kind: device.kind,
                record: Arc::new(Mutex::new(DeviceRecord {
                    device: device.clone(),
                    nav: NavigationState::default(),
                    queue: VecDeque::new(),
                    preempt_epoch: 0,
                })),
            },
        );

        Ok(device)
    }

    /// Remove a device from the registry.
    pub async fn unregister(&self, device_id: &str) -> Result<(), FleetError> {
        let mut devices = self.devices.write().await;
        devices
            .remove(device_id)
            .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))?;
        self.routes.lock().unwrap().unassign(device_id);
        info!(device_id, "device unregistered");
        Ok(())
    }

    /// Accept a command for a device.
    ///
    /// Returns an acknowledgement ticket immediately; execution happens on
    /// a spawned task after the configured settle delay. `EmergencyStop`
    /// executes inline and preempts any in-flight execution on the same
    /// device.
    pub async fn send_command(
        &self,
        device_id: &str,
        kind: CommandKind,
    ) -> Result<CommandTicket, FleetError> {
        let handle = {
            let devices = self.devices.read().await;
            devices
                .get(device_id)
                .map(|h| h.record.clone())
                .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))?
        };

        if let CommandKind::FollowRoute { route_id } = &kind {
            if !self.routes.lock().unwrap().contains(route_id) {
                return Err(FleetError::RouteNotFound(route_id.clone()));
            }
        }

        let mut record = handle.lock().await;
        if !record.device.status.is_commandable() {
            return Err(FleetError::DeviceOffline(device_id.to_string()));
        }

        let now = now_ms();
        let command_id = next_id("cmd");
        let command = Command::new(command_id.clone(), device_id.to_string(), kind.clone(), now);
        self.log.lock().unwrap().push(command);

        if record.queue.len() >= self.config.device_queue {
            record.queue.pop_front();
        }
        record.queue.push_back(command_id.clone());

        info!(device_id, command_id = %command_id, kind = kind.name(), "command accepted");

        let (tx, rx) = oneshot::channel();

        if let CommandKind::EmergencyStop { reason } = &kind {
            record.preempt_epoch += 1;
            apply_emergency(&mut record, now);
            warn!(device_id, reason = %reason, "emergency stop applied");
            let done = self.log.lock().unwrap().update(&command_id, |c| {
                c.mark_executing();
                c.complete(now);
            });
            if let Some(cmd) = done {
                let _ = tx.send(cmd);
            }
            return Ok(CommandTicket {
                command_id,
                completion: rx,
            });
        }

        if matches!(kind, CommandKind::Takeoff { .. }) && record.device.status != DeviceStatus::Idle
        {
            let failed = self
                .log
                .lock()
                .unwrap()
                .update(&command_id, |c| c.fail("takeoff requires idle device", now));
            if let Some(cmd) = failed {
                let _ = tx.send(cmd);
            }
            return Ok(CommandTicket {
                command_id,
                completion: rx,
            });
        }

        // Immediate phase: command starts executing, intermediate device
        // state becomes visible before the settle delay elapses.
        self.log
            .lock()
            .unwrap()
            .update(&command_id, |c| c.mark_executing());
        match &kind {
            CommandKind::Takeoff { .. } => record.device.status = DeviceStatus::Takeoff,
            CommandKind::Land => record.device.status = DeviceStatus::Landing,
            CommandKind::Goto { target } => record.nav.target = Some(*target),
            _ => {}
        }

        let epoch = record.preempt_epoch;
        drop(record);

        let settle_ms = match &kind {
            CommandKind::Takeoff { .. } => self.config.takeoff_settle_ms,
            CommandKind::Land => self.config.land_settle_ms,
            _ => self.config.command_settle_ms,
        };

        let record_arc = handle.clone();
        let log = Arc::clone(&self.log);
        let config = self.config.clone();
        let task_command_id = command_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(settle_ms)).await;

            let mut record = record_arc.lock().await;
            let finished_at = now_ms();
            let outcome = if record.preempt_epoch != epoch {
                log.lock().unwrap().update(&task_command_id, |c| {
                    c.fail("preempted by emergency stop", finished_at)
                })
            } else {
                apply_terminal(&mut record, &kind, &config, finished_at);
                record.device.last_update_ms = finished_at;
                log.lock()
                    .unwrap()
                    .update(&task_command_id, |c| c.complete(finished_at))
            };
            if let Some(cmd) = outcome {
                let _ = tx.send(cmd);
            }
        });

        Ok(CommandTicket {
            command_id,
            completion: rx,
        })
    }

    /// Snapshot of one device.
    pub async fn device(&self, device_id: &str) -> Option<Device> {
        let handle = {
            let devices = self.devices.read().await;
            devices.get(device_id).map(|h| h.record.clone())
        }?;
        let record = handle.lock().await;
        Some(record.device.clone())
    }

    /// Snapshot of one device's navigation state.
    pub async fn navigation(&self, device_id: &str) -> Option<NavigationState> {
        let handle = {
            let devices = self.devices.read().await;
            devices.get(device_id).map(|h| h.record.clone())
        }?;
        let record = handle.lock().await;
        Some(record.nav.clone())
    }

    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn device_ids(&self) -> Vec<String> {
        self.devices.read().await.keys().cloned().collect()
    }

    /// Pollable view of one command in the global history.
    pub fn command_status(&self, command_id: &str) -> Option<Command> {
        self.log.lock().unwrap().get(command_id)
    }

    /// Snapshot of the bounded fleet-wide command history, oldest first.
    pub fn command_history(&self) -> Vec<Command> {
        self.log.lock().unwrap().snapshot()
    }

    /// Commands queued against one device, resolved through the history.
    pub async fn device_queue(&self, device_id: &str) -> Vec<Command> {
        let handle = {
            let devices = self.devices.read().await;
            devices.get(device_id).map(|h| h.record.clone())
        };
        let Some(handle) = handle else {
            return Vec::new();
        };
        let record = handle.lock().await;
        let log = self.log.lock().unwrap();
        record.queue.iter().filter_map(|id| log.get(id)).collect()
    }

    /// Apply a partial telemetry update. Idempotent, last-write-wins,
    /// always refreshes the device's freshness timestamp.
    pub async fn apply_telemetry(
        &self,
        device_id: &str,
        update: TelemetryUpdate,
    ) -> Result<Device, FleetError> {
        let handle = {
            let devices = self.devices.read().await;
            devices
                .get(device_id)
                .map(|h| h.record.clone())
                .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))?
        };
        let mut record = handle.lock().await;
        update.apply_to(&mut record.device, now_ms());
        Ok(record.device.clone())
    }

    /// Record whether the latest evaluation cycle saw obstacles for a device.
    pub async fn note_obstacles(
        &self,
        device_id: &str,
        detected: bool,
    ) -> Result<(), FleetError> {
        let handle = {
            let devices = self.devices.read().await;
            devices
                .get(device_id)
                .map(|h| h.record.clone())
                .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))?
        };
        let mut record = handle.lock().await;
        record.nav.obstacle_detected = detected;
        Ok(())
    }

    /// Mark a device unreachable. Subsequent commands fail `DeviceOffline`.
    pub async fn mark_offline(&self, device_id: &str) -> Result<(), FleetError> {
        let handle = {
            let devices = self.devices.read().await;
            devices
                .get(device_id)
                .map(|h| h.record.clone())
                .ok_or_else(|| FleetError::DeviceNotFound(device_id.to_string()))?
        };
        let mut record = handle.lock().await;
        record.device.status = DeviceStatus::Offline;
        warn!(device_id, "device marked offline");
        Ok(())
    }

    /// Advisory sweep across the fleet. Never errors.
    pub async fn health_report(&self, now_ms: u64) -> Vec<DeviceAdvisory> {
        let handles: Vec<(String, Arc<Mutex<DeviceRecord>>)> = {
            let devices = self.devices.read().await;
            devices
                .iter()
                .map(|(id, h)| (id.clone(), h.record.clone()))
                .collect()
        };

        let mut report = Vec::new();
        for (device_id, handle) in handles {
            let record = handle.lock().await;
            for advisory in sweep_device(&record.device, &self.config, now_ms) {
                report.push(DeviceAdvisory {
                    device_id: device_id.clone(),
                    advisory,
                });
            }
        }
        report
    }

    /// Install a single route.
    pub fn install_route(&self, route: Route) {
        self.routes.lock().unwrap().install(route);
    }

    pub fn route(&self, route_id: &str) -> Option<Route> {
        self.routes.lock().unwrap().get(route_id).cloned()
    }

    pub fn route_count(&self) -> usize {
        self.routes.lock().unwrap().len()
    }

    /// Route assigned to a device by the last mission import.
    pub fn assigned_route(&self, device_id: &str) -> Option<String> {
        self.routes
            .lock()
            .unwrap()
            .assigned_route(device_id)
            .map(str::to_string)
    }

    /// Delete a route. Fails with `RouteInUse` while any device's active
    /// route references it; no partial mutation on rejection.
    pub async fn delete_route(&self, route_id: &str) -> Result<Route, FleetError> {
        let devices = self.devices.read().await;
        for (device_id, handle) in devices.iter() {
            let record = handle.record.lock().await;
            if record.nav.active_route.as_deref() == Some(route_id) {
                return Err(FleetError::RouteInUse {
                    route_id: route_id.to_string(),
                    device_id: device_id.clone(),
                });
            }
        }
        self.routes
            .lock()
            .unwrap()
            .remove(route_id)
            .ok_or_else(|| FleetError::RouteNotFound(route_id.to_string()))
    }

    /// Validate and install a mission document atomically.
    ///
    /// A document that fails validation installs nothing and returns the
    /// full aggregated report.
    pub fn import_mission(
        &self,
        document: MissionDocument,
    ) -> Result<MissionSummary, ValidationReport> {
        let report = document.validate();
        if !report.is_ok() {
            warn!(
                mission_id = %document.metadata.id,
                errors = report.errors.len(),
                "mission document rejected"
            );
            return Err(report);
        }

        let routes_loaded = document.routes.len();
        let assignment_count = document.assignments.len();
        {
            let mut routes = self.routes.lock().unwrap();
            for route in document.routes {
                routes.install(route);
            }
            for (device_id, route_id) in document.assignments {
                routes.assign(device_id, route_id);
            }
        }

        info!(
            mission_id = %document.metadata.id,
            routes_loaded,
            "mission imported"
        );

        Ok(MissionSummary {
            mission_id: document.metadata.id,
            routes_loaded,
            assignments: assignment_count,
            warnings: report.warnings,
        })
    }
}

/// Force the emergency state: status and mode `Emergency`, zero speed.
fn apply_emergency(record: &mut DeviceRecord, timestamp_ms: u64) {
    record.device.status = DeviceStatus::Emergency;
    record.device.speed_kts = 0.0;
    record.device.last_update_ms = timestamp_ms;
    record.nav.mode = NavMode::Emergency;
    record.nav.target = None;
    record.nav.waypoint_index = None;
}

/// Apply a command's terminal transition to the device.
fn apply_terminal(
    record: &mut DeviceRecord,
    kind: &CommandKind,
    config: &FleetConfig,
    timestamp_ms: u64,
) {
    match kind {
        CommandKind::Takeoff { altitude_m } => {
            record.device.status = DeviceStatus::Flying;
            record.device.altitude_m = Some(altitude_m.unwrap_or(config.cruise_altitude_m));
        }
        CommandKind::Land => {
            record.device.status = DeviceStatus::Idle;
            record.device.speed_kts = 0.0;
            if record.device.altitude_m.is_some() {
                record.device.altitude_m = Some(0.0);
            }
            record.nav.mode = NavMode::Manual;
            record.nav.target = None;
            record.nav.waypoint_index = None;
            record.nav.active_route = None;
        }
        CommandKind::Goto { target } => {
            record.device.status = DeviceStatus::Flying;
            record.device.lat = target.lat;
            record.device.lon = target.lon;
            if let Some(alt) = target.alt {
                record.device.altitude_m = Some(alt);
            }
            record.nav.target = None;
        }
        CommandKind::Hover { .. } => {
            record.device.status = match record.device.kind {
                DeviceKind::Aerial => DeviceStatus::Hovering,
                DeviceKind::Surface => DeviceStatus::Holding,
            };
            record.device.speed_kts = 0.0;
            record.nav.mode = NavMode::HoldPosition;
        }
        CommandKind::ReturnHome => {
            record.device.status = DeviceStatus::Flying;
        }
        CommandKind::FollowRoute { route_id } => {
            record.device.status = DeviceStatus::Navigating;
            record.nav.mode = NavMode::WaypointFollow;
            record.nav.active_route = Some(route_id.clone());
            record.nav.waypoint_index = Some(0);
        }
        CommandKind::EmergencyStop { .. } => apply_emergency(record, timestamp_ms),
    }
}
