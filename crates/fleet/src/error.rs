//! Fleet error taxonomy.
//!
//! Capacity, reference and state-conflict failures are rejected
//! synchronously and atomically; advisory conditions never appear here.

use thiserror::Error;

use crate::device::DeviceKind;

/// Fleet registry and command executor errors
#[derive(Debug, Error)]
pub enum FleetError {
    /// Fleet is at its configured maximum for this device kind
    #[error("Fleet at capacity for {kind:?} devices (limit {limit})")]
    CapacityExceeded {
        /// Kind that hit the limit
        kind: DeviceKind,
        /// Configured maximum
        limit: usize,
    },

    /// A device with this identity is already registered
    #[error("Device already registered: {0}")]
    DuplicateId(String),

    /// No device with this identity is registered
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device is offline and cannot accept commands
    #[error("Device offline: {0}")]
    DeviceOffline(String),

    /// follow_route referenced a route that is not installed
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// The route is referenced by an active device and cannot be deleted
    #[error("Route {route_id} is in use by device {device_id}")]
    RouteInUse {
        /// Route that was targeted for deletion
        route_id: String,
        /// Device whose active route references it
        device_id: String,
    },
}
