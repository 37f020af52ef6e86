//! Cross-crate integration tests for the PelorusCore coordination core.
//!
//! This test suite validates:
//! - The register → command → state-transition flow end to end
//! - Emergency preemption across the executor's async boundary
//! - The sensors → decision engine → fleet command pipeline
//! - Safety fallback precedence on telemetry loss
//! - Mission import feeding route-following devices
//! - Task coordination against the audit sink

pub mod test_utils;

#[cfg(test)]
mod command_flow_tests;

#[cfg(test)]
mod navigation_pipeline_tests;

#[cfg(test)]
mod safety_fallback_tests;

#[cfg(test)]
mod mission_import_tests;

#[cfg(test)]
mod coordination_tests;
