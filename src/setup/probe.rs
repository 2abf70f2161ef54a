// src/setup/probe.rs

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::ProbeTool;

/// Checks whether external executables are present and invocable.
///
/// A tool counts as available when `name args...` can be spawned and exits
/// successfully. Every failure mode, including "not on PATH", is just `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolProbe;

impl ToolProbe {
    pub fn new() -> Self {
        Self
    }

    pub async fn is_available(&self, tool: &ProbeTool) -> bool {
        let output = Command::new(&tool.name)
            .args(&tool.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                debug!(
                    tool = %tool.name,
                    version = %String::from_utf8_lossy(&out.stdout).trim(),
                    "tool available"
                );
                true
            }
            Ok(out) => {
                debug!(tool = %tool.name, exit_code = ?out.status.code(), "tool exited unsuccessfully");
                false
            }
            Err(e) => {
                debug!(tool = %tool.name, error = %e, "tool could not be invoked");
                false
            }
        }
    }

    /// Probe every tool in order and return the names of the missing ones.
    pub async fn missing(&self, tools: &[ProbeTool]) -> Vec<String> {
        let mut missing = Vec::new();
        for tool in tools {
            if !self.is_available(tool).await {
                missing.push(tool.name.clone());
            }
        }
        missing
    }
}
