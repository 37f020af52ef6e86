//! Wall-clock and identifier helpers.
//!
//! Domain logic throughout the workspace takes `timestamp_ms: u64` arguments
//! so state transitions stay hermetic under test; these helpers live at the
//! call boundary where real time enters the system.

use std::sync::atomic::{AtomicU64, Ordering};

/// Get current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as u64
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique identifier with the given prefix.
///
/// Identifiers are monotonic within a process (`cmd-000001`, `cmd-000002`,
/// ...), which keeps command and log ordering inspectable in test output.
pub fn next_id(prefix: &str) -> String {
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:06}", prefix, n)
}
