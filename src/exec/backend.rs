// src/exec/backend.rs

//! Pluggable process-launching abstraction.
//!
//! The supervisor talks to a `ProcessLauncher` instead of calling
//! `tokio::process::Command` directly. This makes it easy to swap in a fake
//! process in tests while keeping the production implementation here.
//!
//! - `RealProcessLauncher` spawns an OS process with piped stdout/stderr.
//! - Tests can provide their own `ProcessLauncher` that hands back in-memory
//!   pipes and a scriptable exit status.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::errors::{LaunchError, Result};

/// What to launch. Supplied by the caller; the supervisor never builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Wrap in `sh -c` / `cmd /C` instead of exec'ing `program` directly.
    pub shell: bool,
}

impl SpawnSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            shell: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Program and arguments joined with spaces, for display and for the
    /// shell-wrapped form.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the `tokio` command for this spec (no stdio wiring).
    pub fn to_command(&self) -> Command {
        let mut cmd = if self.shell {
            // Build a shell command appropriate for the platform.
            if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(self.command_line());
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(self.command_line());
                c
            }
        } else {
            let mut c = Command::new(&self.program);
            c.args(&self.args);
            c
        };

        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for SpawnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// How the child ended, as far as the platform can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl From<std::process::ExitStatus> for ExitInfo {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Boxed raw output stream of a child.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Control surface over one spawned child.
///
/// Exclusively owned by the supervisor; never touched again once
/// `try_wait` has returned `Some` or termination has been given up on.
pub trait ProcessHandle: Send {
    fn id(&self) -> Option<u32>;

    /// Non-blocking exit check.
    fn try_wait(&mut self) -> std::io::Result<Option<ExitInfo>>;

    /// Ask the child to stop. Best effort; does not wait.
    fn terminate(&mut self) -> std::io::Result<()>;
}

/// A freshly spawned child: its handle plus both raw output streams.
pub struct SpawnedProcess {
    pub handle: Box<dyn ProcessHandle>,
    pub stdout: OutputStream,
    pub stderr: OutputStream,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.handle.id())
            .finish_non_exhaustive()
    }
}

/// Trait abstracting how a child process comes into existence.
///
/// Production code uses [`RealProcessLauncher`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the child described by `spec`. Failure here is the only error a
    /// supervised run can surface synchronously.
    fn launch(&self, spec: &SpawnSpec) -> Result<SpawnedProcess>;
}

/// Real launcher used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn launch(&self, spec: &SpawnSpec) -> Result<SpawnedProcess> {
        info!(cmd = %spec, cwd = ?spec.cwd, shell = spec.shell, "spawning process");

        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            LaunchError::Other(anyhow::anyhow!("child stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            LaunchError::Other(anyhow::anyhow!("child stderr was not captured"))
        })?;

        debug!(pid = ?child.id(), "process spawned");

        Ok(SpawnedProcess {
            handle: Box::new(ChildHandle { child }),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        })
    }
}

/// `ProcessHandle` over a real `tokio::process::Child`.
struct ChildHandle {
    child: Child,
}

impl ProcessHandle for ChildHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_wait(&mut self) -> std::io::Result<Option<ExitInfo>> {
        Ok(self.child.try_wait()?.map(ExitInfo::from))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> std::io::Result<()> {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        // `id()` is None once the child has been reaped; nothing to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        debug!(pid, "sending SIGTERM");
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(std::io::Error::from)
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> std::io::Result<()> {
        debug!(pid = ?self.child.id(), "requesting process kill");
        self.child.start_kill()
    }
}
