//! Subscriber setup for the dashboard binaries.

use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines, timestamped, filtered
/// through `RUST_LOG` (default `info`).
///
/// Safe to call more than once; a second install attempt is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(SystemTime)
        .with_target(false)
        .try_init();
}
