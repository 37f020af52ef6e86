//! Fleet management for PelorusCore.
//!
//! Owns the authoritative state of every registered device, accepts
//! commands, queues and asynchronously executes them, and advances each
//! device's state machine. Also home to the route/mission store and the
//! advisory health sweep.

pub mod command;
pub mod device;
pub mod error;
pub mod health;
pub mod mission;
pub mod registry;
pub mod routes;
pub mod telemetry;

pub use command::{Command, CommandKind, CommandStatus, CommandTicket};
pub use device::{Device, DeviceKind, DeviceSpec, DeviceStatus, NavMode, NavigationState};
pub use error::FleetError;
pub use health::{Advisory, DeviceAdvisory};
pub use mission::{MissionDocument, MissionSummary, ValidationReport};
pub use registry::FleetRegistry;
pub use routes::{Route, Waypoint};
pub use telemetry::TelemetryUpdate;
