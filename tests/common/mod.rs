#![allow(dead_code)]

pub use devlaunch_test_utils::builders::ConfigFileBuilder;
pub use devlaunch_test_utils::fake_launcher::{FakeLauncher, FakeProcessControl, OnTerminate};
pub use devlaunch_test_utils::recording_sink::RecordingSink;
pub use devlaunch_test_utils::{default_pattern, fast_options, init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::Mutex;

/// Collects every value the readiness callback is invoked with.
#[derive(Debug, Clone, Default)]
pub struct ReadyCalls {
    calls: Arc<Mutex<Vec<String>>>,
}

impl ReadyCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnOnce(&str) + Send + 'static {
        let calls = Arc::clone(&self.calls);
        move |url: &str| calls.lock().unwrap().push(url.to_string())
    }

    pub fn values(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}
