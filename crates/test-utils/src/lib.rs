pub mod builders;
pub mod fake_launcher;
pub mod recording_sink;

use std::sync::Once;
use std::time::Duration;

use devlaunch::config::DEFAULT_READY_PATTERN;
use devlaunch::exec::{ReadinessPattern, SupervisorOptions};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// The built-in readiness pattern, compiled.
pub fn default_pattern() -> ReadinessPattern {
    ReadinessPattern::new(DEFAULT_READY_PATTERN).expect("default readiness pattern compiles")
}

/// Supervisor options with short timings so tests finish quickly.
pub fn fast_options() -> SupervisorOptions {
    SupervisorOptions {
        pattern: default_pattern(),
        poll_interval: Duration::from_millis(5),
        grace_period: Duration::from_millis(300),
        drain_poll: Duration::from_millis(20),
        drain_timeout: Duration::from_millis(200),
    }
}
