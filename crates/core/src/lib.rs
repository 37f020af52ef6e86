//! Core functionality for the PelorusCore coordination system.
//!
//! This crate provides the configuration, error, logging, timing and audit
//! utilities shared across the Pelorus ecosystem.

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use audit::{AuditSink, FailingSink, MemorySink, NullSink, SinkError};
pub use config::PelorusConfig;
pub use error::CoreError;
pub use time::{next_id, now_ms};
