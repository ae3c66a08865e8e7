//! Test harness helpers.

use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test writer.
///
/// Honors `RUST_LOG` and falls back to `herald_events=debug`. Safe to call
/// from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("herald_events=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Poll `condition` every millisecond until it holds or `timeout` elapses.
///
/// Returns whether the condition was met. Used to observe deliveries made on
/// another thread.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if condition() {
            return true;
        }
        if deadline.is_none_or(|deadline| Instant::now() >= deadline) {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}
