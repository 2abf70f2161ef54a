use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncWriteExt, DuplexStream};

use devlaunch::errors::{LaunchError, Result};
use devlaunch::exec::{ExitInfo, ProcessHandle, ProcessLauncher, SpawnSpec, SpawnedProcess};

/// What the fake process does when asked to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTerminate {
    /// Exit right away with this code.
    Exit(Option<i32>),
    /// Keep running (simulates a child that ignores SIGTERM).
    Ignore,
}

#[derive(Debug)]
struct FakeState {
    exit: Option<ExitInfo>,
    terminate_requests: usize,
    on_terminate: OnTerminate,
}

/// Test-side end of a fake process: write its output, decide when it exits.
pub struct FakeProcessControl {
    stdout: Option<DuplexStream>,
    stderr: Option<DuplexStream>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeProcessControl {
    /// Write `line` plus a newline to the fake stdout.
    pub async fn stdout_line(&mut self, line: &str) -> io::Result<()> {
        write_line(self.stdout.as_mut(), line).await
    }

    /// Write `line` plus a newline to the fake stderr.
    pub async fn stderr_line(&mut self, line: &str) -> io::Result<()> {
        write_line(self.stderr.as_mut(), line).await
    }

    /// Close both streams (EOF for the readers).
    pub fn close_streams(&mut self) {
        self.stdout = None;
        self.stderr = None;
    }

    pub fn close_stdout(&mut self) {
        self.stdout = None;
    }

    /// Make the next `try_wait` report an exit.
    pub fn exit(&self, code: Option<i32>) {
        self.state.lock().unwrap().exit = Some(ExitInfo { code });
    }

    pub fn terminate_requests(&self) -> usize {
        self.state.lock().unwrap().terminate_requests
    }
}

async fn write_line(stream: Option<&mut DuplexStream>, line: &str) -> io::Result<()> {
    let stream = stream.ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))?;
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await
}

struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
}

impl ProcessHandle for FakeHandle {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitInfo>> {
        Ok(self.state.lock().unwrap().exit)
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.terminate_requests += 1;
        if let OnTerminate::Exit(code) = state.on_terminate {
            state.exit = Some(ExitInfo { code });
        }
        Ok(())
    }
}

/// A launcher that hands out one in-memory fake process, or always fails.
pub struct FakeLauncher {
    pending: Mutex<Option<SpawnedProcess>>,
    fail_with: Option<String>,
    launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new(on_terminate: OnTerminate) -> (Self, FakeProcessControl) {
        let (stdout_w, stdout_r) = tokio::io::duplex(64 * 1024);
        let (stderr_w, stderr_r) = tokio::io::duplex(64 * 1024);
        let state = Arc::new(Mutex::new(FakeState {
            exit: None,
            terminate_requests: 0,
            on_terminate,
        }));

        let spawned = SpawnedProcess {
            handle: Box::new(FakeHandle {
                state: Arc::clone(&state),
            }),
            stdout: Box::new(stdout_r),
            stderr: Box::new(stderr_r),
        };

        let launcher = Self {
            pending: Mutex::new(Some(spawned)),
            fail_with: None,
            launches: AtomicUsize::new(0),
        };
        let control = FakeProcessControl {
            stdout: Some(stdout_w),
            stderr: Some(stderr_w),
            state,
        };
        (launcher, control)
    }

    /// A launcher whose every launch fails like a missing executable.
    pub fn failing(message: &str) -> Self {
        Self {
            pending: Mutex::new(None),
            fail_with: Some(message.to_string()),
            launches: AtomicUsize::new(0),
        }
    }

    /// Number of launch attempts (successful or not).
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, spec: &SpawnSpec) -> Result<SpawnedProcess> {
        self.launches.fetch_add(1, Ordering::SeqCst);

        if let Some(ref msg) = self.fail_with {
            return Err(LaunchError::Spawn {
                program: spec.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, msg.clone()),
            });
        }

        self.pending.lock().unwrap().take().ok_or_else(|| LaunchError::Spawn {
            program: spec.program.clone(),
            source: io::Error::other("fake process already launched"),
        })
    }
}
