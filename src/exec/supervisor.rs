// src/exec/supervisor.rs

//! Lifecycle of one supervised child: spawn, watch, (maybe) terminate, drain.
//!
//! States, in order:
//!
//! - **Starting**: `ProcessSupervisor::start` spawns the child and attaches
//!   an [`OutputMultiplexer`]. A spawn error ends the run here (**Failed**).
//! - **Watching**: poll for exit, relay at most one line per origin per
//!   iteration, test lines against the readiness pattern until it matches,
//!   sleep briefly when there was nothing to do.
//! - **Terminating**: entered on cancellation. The child has been asked to
//!   stop; output keeps flowing to the sink until it exits or the grace
//!   period runs out. Readiness is no longer evaluated.
//! - **Exited**: a bounded final drain, then a [`RunReport`]. After a natural
//!   exit, drained lines can still set the ready marker, but the readiness
//!   callback no longer runs.

use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::backend::{ExitInfo, ProcessHandle, ProcessLauncher, SpawnSpec};
use crate::exec::multiplexer::OutputMultiplexer;
use crate::exec::readiness::{ReadinessPattern, ReadyCallback, ReadyMarker};
use crate::exec::sink::OutputSink;
use crate::types::{Origin, OutputLine};

/// Timings and the readiness pattern for a supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub pattern: ReadinessPattern,
    /// Sleep between polls that found nothing to do.
    pub poll_interval: Duration,
    /// How long to wait for the child after asking it to terminate.
    pub grace_period: Duration,
    /// Per-origin wait during the final drain.
    pub drain_poll: Duration,
    /// Bound on the whole final drain.
    pub drain_timeout: Duration,
}

impl SupervisorOptions {
    pub fn new(pattern: ReadinessPattern) -> Self {
        Self {
            pattern,
            poll_interval: Duration::from_millis(50),
            grace_period: Duration::from_secs(5),
            drain_poll: Duration::from_millis(100),
            drain_timeout: Duration::from_secs(2),
        }
    }
}

/// Terminal outcome of a supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// The child exited on its own.
    Completed { exit_code: Option<i32> },
    /// The caller cancelled the run. `exit_code` is `None` if the child never
    /// acknowledged termination within the grace period.
    TerminatedByCaller { exit_code: Option<i32> },
    /// The child could not be spawned.
    CrashedEarly { reason: String },
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunResult::Completed { exit_code: Some(code) } => {
                write!(f, "process exited with code {code}")
            }
            RunResult::Completed { exit_code: None } => {
                f.write_str("process exited without an exit code")
            }
            RunResult::TerminatedByCaller { .. } => f.write_str("process stopped on request"),
            RunResult::CrashedEarly { reason } => write!(f, "process failed to start: {reason}"),
        }
    }
}

/// Non-fatal conditions worth telling the user about once, at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionNote {
    /// The run ended without any line matching the readiness pattern.
    ReadinessNotDetected,
    /// Termination was requested but the child was still running when the
    /// grace period ran out.
    TerminationTimeout { grace: Duration },
}

/// Number of lines relayed per origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayCounts {
    pub stdout: u64,
    pub stderr: u64,
}

impl RelayCounts {
    fn bump(&mut self, origin: Origin) {
        match origin {
            Origin::Stdout => self.stdout += 1,
            Origin::Stderr => self.stderr += 1,
        }
    }
}

/// Everything the caller learns when supervision ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub result: RunResult,
    pub ready_url: Option<String>,
    pub notes: Vec<SupervisionNote>,
    pub relayed: RelayCounts,
}

impl RunReport {
    fn crashed(reason: String) -> Self {
        Self {
            result: RunResult::CrashedEarly { reason },
            ready_url: None,
            notes: Vec::new(),
            relayed: RelayCounts::default(),
        }
    }

    pub fn has_note(&self, note: &SupervisionNote) -> bool {
        self.notes.contains(note)
    }
}

/// Per-run consumers: where lines go and what to do once ready.
pub struct RunHooks {
    sink: Box<dyn OutputSink>,
    on_ready: Option<ReadyCallback>,
}

impl RunHooks {
    pub fn new(sink: impl OutputSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            on_ready: None,
        }
    }

    pub fn on_ready(mut self, callback: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for RunHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHooks")
            .field("on_ready", &self.on_ready.is_some())
            .finish_non_exhaustive()
    }
}

/// Launches children and hands back a [`Supervision`] per launch.
///
/// Holds no per-run state, so any number of runs can be supervised
/// independently from one instance.
#[derive(Debug)]
pub struct ProcessSupervisor<L: ProcessLauncher> {
    launcher: L,
    options: SupervisorOptions,
}

impl<L: ProcessLauncher> ProcessSupervisor<L> {
    pub fn new(launcher: L, options: SupervisorOptions) -> Self {
        Self { launcher, options }
    }

    pub fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Spawn the child and attach the multiplexer (**Starting**).
    ///
    /// Spawn failures are returned here; nothing is started in that case.
    pub fn start(&self, spec: &SpawnSpec, hooks: RunHooks) -> Result<Supervision> {
        let spawned = self.launcher.launch(spec)?;
        let pid = spawned.handle.id();
        info!(?pid, cmd = %spec, "process started; watching output");

        Ok(Supervision {
            pid,
            handle: spawned.handle,
            mux: OutputMultiplexer::attach(spawned.stdout, spawned.stderr),
            options: self.options.clone(),
            sink: hooks.sink,
            on_ready: hooks.on_ready,
            marker: ReadyMarker::new(),
            relayed: RelayCounts::default(),
            notes: Vec::new(),
        })
    }

    /// `start` + `run`, with a spawn failure folded into
    /// [`RunResult::CrashedEarly`].
    pub async fn supervise(
        &self,
        spec: &SpawnSpec,
        hooks: RunHooks,
        cancel: oneshot::Receiver<()>,
    ) -> RunReport {
        match self.start(spec, hooks) {
            Ok(supervision) => supervision.run(cancel).await,
            Err(err) => {
                warn!(cmd = %spec, error = %err, "process failed to start");
                RunReport::crashed(err.to_string())
            }
        }
    }
}

/// What a relayed line may do to the ready marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detection {
    /// Set the marker and run the readiness callback.
    Notify,
    /// Set the marker only; the process is already gone.
    Record,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Watching,
    Terminating { deadline: Instant },
}

/// One running child under supervision.
pub struct Supervision {
    pid: Option<u32>,
    handle: Box<dyn ProcessHandle>,
    mux: OutputMultiplexer,
    options: SupervisorOptions,
    sink: Box<dyn OutputSink>,
    on_ready: Option<ReadyCallback>,
    marker: ReadyMarker,
    relayed: RelayCounts,
    notes: Vec<SupervisionNote>,
}

impl fmt::Debug for Supervision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervision")
            .field("pid", &self.pid)
            .field("marker", &self.marker)
            .field("relayed", &self.relayed)
            .finish_non_exhaustive()
    }
}

impl Supervision {
    /// Drive the run to completion.
    ///
    /// `cancel` firing means "stop the server". A sender dropped without
    /// sending is not a cancellation.
    pub async fn run(mut self, mut cancel: oneshot::Receiver<()>) -> RunReport {
        let mut phase = Phase::Watching;
        let mut cancel_open = true;

        let exit = loop {
            match self.handle.try_wait() {
                Ok(Some(info)) => {
                    info!(pid = ?self.pid, exit_code = ?info.code, "process exited");
                    break Some(info);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(pid = ?self.pid, error = %e, "failed to poll process status; assuming exited");
                    break None;
                }
            }

            if cancel_open && phase == Phase::Watching {
                match cancel.try_recv() {
                    Ok(()) => phase = self.begin_termination(),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Closed) => {
                        debug!("cancel channel closed without explicit cancellation");
                        cancel_open = false;
                    }
                }
            }

            if let Phase::Terminating { deadline } = phase {
                if Instant::now() >= deadline {
                    warn!(
                        pid = ?self.pid,
                        grace = ?self.options.grace_period,
                        "process did not exit within grace period; giving up on it"
                    );
                    self.notes.push(SupervisionNote::TerminationTimeout {
                        grace: self.options.grace_period,
                    });
                    break None;
                }
            }

            let detection = match phase {
                Phase::Watching => Detection::Notify,
                Phase::Terminating { .. } => Detection::Off,
            };
            let mut relayed_any = false;
            for origin in Origin::ALL {
                if let Some(line) = self.mux.try_next(origin) {
                    self.relay(line, detection);
                    relayed_any = true;
                }
            }

            if !relayed_any {
                sleep(self.options.poll_interval).await;
            }
        };

        // A ready line that only shows up after a natural exit still counts,
        // but nobody is left to open it for.
        let detection = match phase {
            Phase::Watching => Detection::Record,
            Phase::Terminating { .. } => Detection::Off,
        };
        self.drain(detection).await;

        let exit_code = exit.and_then(|ExitInfo { code }| code);
        let result = match phase {
            Phase::Watching => RunResult::Completed { exit_code },
            Phase::Terminating { .. } => RunResult::TerminatedByCaller { exit_code },
        };

        if !self.marker.is_set() {
            debug!("run ended without readiness being detected");
            self.notes.push(SupervisionNote::ReadinessNotDetected);
        }

        info!(
            pid = ?self.pid,
            result = %result,
            stdout_lines = self.relayed.stdout,
            stderr_lines = self.relayed.stderr,
            "supervision finished"
        );

        RunReport {
            result,
            ready_url: self.marker.into_value(),
            notes: self.notes,
            relayed: self.relayed,
        }
    }

    fn begin_termination(&mut self) -> Phase {
        info!(pid = ?self.pid, "cancellation requested; terminating process");
        if let Err(e) = self.handle.terminate() {
            warn!(pid = ?self.pid, error = %e, "failed to send terminate to process");
        }
        Phase::Terminating {
            deadline: Instant::now() + self.options.grace_period,
        }
    }

    /// Forward one line to the sink and, unless detection is off or the
    /// marker is already set, test it for readiness.
    fn relay(&mut self, line: OutputLine, detection: Detection) {
        self.sink.relay(line.origin, &line.text);
        self.relayed.bump(line.origin);

        if detection == Detection::Off || self.marker.is_set() {
            return;
        }

        let Some(value) = self.options.pattern.capture(&line.text) else {
            return;
        };

        if self.marker.set(value.clone()) {
            info!(url = %value, origin = %line.origin, sequence = line.sequence, "readiness detected");
            if detection == Detection::Notify {
                if let Some(callback) = self.on_ready.take() {
                    callback(&value);
                }
            } else {
                debug!(url = %value, "process already exited; readiness callback skipped");
            }
        }
    }

    /// Relay what is already queued, without waiting, until `deadline`.
    ///
    /// A child still writing keeps refilling the queues, so emptiness alone
    /// is not a stopping condition.
    fn flush_queued(&mut self, detection: Detection, deadline: Instant) -> bool {
        let mut any = false;
        for origin in Origin::ALL {
            while Instant::now() < deadline {
                let Some(line) = self.mux.try_next(origin) else {
                    break;
                };
                self.relay(line, detection);
                any = true;
            }
        }
        any
    }

    /// Final bounded flush (**Exited**).
    ///
    /// Queued lines go out first. After that each round waits up to
    /// `drain_poll` per origin for stragglers, until a round comes back
    /// empty, both streams are closed, or `drain_timeout` has passed.
    async fn drain(&mut self, detection: Detection) {
        let deadline = Instant::now() + self.options.drain_timeout;
        self.flush_queued(detection, deadline);

        loop {
            if self.mux.is_exhausted() {
                debug!("both output streams closed; drain complete");
                return;
            }

            let mut any = false;
            for origin in Origin::ALL {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                let wait = self.options.drain_poll.min(remaining);
                if let Some(line) = self.mux.drain(origin, wait).await {
                    self.relay(line, detection);
                    any = true;
                }
            }
            any |= self.flush_queued(detection, deadline);

            if !any {
                debug!("no further output; drain complete");
                return;
            }
            if Instant::now() >= deadline {
                debug!(timeout = ?self.options.drain_timeout, "drain timeout reached");
                return;
            }
        }
    }
}
