//! Safety fallback monitor for PelorusCore.
//!
//! Event-driven: the caller invokes `trigger` the moment telemetry loss or
//! a critical sensor condition is detected. The resulting action takes
//! precedence over any pending navigation decision or queued command for
//! that device in the same cycle.

pub mod monitor;

pub use monitor::{FallbackAction, FallbackMonitor, FallbackReason, FallbackRecord};
