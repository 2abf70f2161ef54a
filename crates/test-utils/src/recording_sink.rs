use std::sync::{Arc, Mutex};
use std::time::Duration;

use devlaunch::exec::OutputSink;
use devlaunch::types::Origin;

/// A sink that records every relayed line. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<(Origin, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Origin, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Texts relayed for one origin, in relay order.
    pub fn texts(&self, origin: Origin) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == origin)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Poll until at least `n` lines have been relayed. Panics after 5s.
    pub async fn wait_for(&self, n: usize) {
        for _ in 0..500 {
            if self.len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sink saw {} lines, expected at least {}", self.len(), n);
    }
}

impl OutputSink for RecordingSink {
    fn relay(&mut self, origin: Origin, text: &str) {
        self.lines.lock().unwrap().push((origin, text.to_string()));
    }
}
