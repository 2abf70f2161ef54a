// src/exec/mod.rs

//! Process supervision layer.
//!
//! This module is responsible for running the dev server with
//! `tokio::process::Command`, relaying its output as it arrives, and spotting
//! the one line that says it is ready.
//!
//! - [`backend`] provides the `ProcessLauncher` / `ProcessHandle` seam and the
//!   real implementation; tests replace it with a fake.
//! - [`multiplexer`] turns the child's stdout and stderr into two
//!   non-blocking per-origin queues.
//! - [`readiness`] holds the readiness pattern and its one-shot latch.
//! - [`supervisor`] owns the watch / terminate / drain state machine.
//! - [`sink`] is where relayed lines end up.
//! - [`browser`] opens the detected URL.

pub mod backend;
pub mod browser;
pub mod multiplexer;
pub mod readiness;
pub mod sink;
pub mod supervisor;

pub use backend::{
    ExitInfo, OutputStream, ProcessHandle, ProcessLauncher, RealProcessLauncher, SpawnSpec,
    SpawnedProcess,
};
pub use browser::open_in_browser;
pub use multiplexer::OutputMultiplexer;
pub use readiness::{ReadinessPattern, ReadyCallback, ReadyMarker};
pub use sink::{OutputSink, StdioSink};
pub use supervisor::{
    ProcessSupervisor, RelayCounts, RunHooks, RunReport, RunResult, Supervision,
    SupervisionNote, SupervisorOptions,
};
