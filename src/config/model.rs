// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::{ReadinessPattern, SpawnSpec, SupervisorOptions};

/// Default readiness pattern: a Vite-style `Local:   http://localhost:5173/`
/// banner, capturing the URL.
pub const DEFAULT_READY_PATTERN: &str = r"Local:\s+(https?://[^\s/]+:\d+/)";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// program = "npm"
/// args = ["run", "dev"]
///
/// [ready]
/// pattern = 'Local:\s+(https?://[^\s/]+:\d+/)'
/// open_browser = true
///
/// [install]
/// marker = "node_modules"
/// program = "npm"
/// args = ["install"]
///
/// [[probe]]
/// name = "node"
/// args = ["-v"]
///
/// [shutdown]
/// grace_period = "5s"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub ready: RawReadySection,

    #[serde(default)]
    pub install: InstallSection,

    /// Tools that must be invocable before anything else happens.
    #[serde(default = "default_probes")]
    pub probe: Vec<ProbeTool>,

    #[serde(default)]
    pub shutdown: RawShutdownSection,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            ready: RawReadySection::default(),
            install: InstallSection::default(),
            probe: default_probes(),
            shutdown: RawShutdownSection::default(),
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holding one means the regex compiled and every duration parsed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub ready: ReadySection,
    pub install: InstallSection,
    pub probe: Vec<ProbeTool>,
    pub shutdown: ShutdownSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        server: ServerSection,
        ready: ReadySection,
        install: InstallSection,
        probe: Vec<ProbeTool>,
        shutdown: ShutdownSection,
    ) -> Self {
        Self {
            server,
            ready,
            install,
            probe,
            shutdown,
        }
    }

    /// The spawn specification for the dev server.
    pub fn spawn_spec(&self) -> SpawnSpec {
        SpawnSpec {
            program: self.server.program.clone(),
            args: self.server.args.clone(),
            cwd: self.server.cwd.clone(),
            shell: self.server.shell,
        }
    }

    /// Supervisor timings + readiness pattern.
    pub fn supervisor_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            pattern: self.ready.pattern.clone(),
            poll_interval: self.shutdown.poll_interval,
            grace_period: self.shutdown.grace_period,
            drain_poll: self.shutdown.drain_poll,
            drain_timeout: self.shutdown.drain_timeout,
        }
    }
}

/// `[server]` section: what to launch.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_server_program")]
    pub program: String,

    #[serde(default = "default_server_args")]
    pub args: Vec<String>,

    /// Working directory for the child; `None` inherits ours.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Run through `sh -c` / `cmd /C` instead of exec'ing `program` directly.
    ///
    /// Needed on Windows for `npm`, which is a `.cmd` shim.
    #[serde(default)]
    pub shell: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            program: default_server_program(),
            args: default_server_args(),
            cwd: None,
            shell: false,
        }
    }
}

fn default_server_program() -> String {
    "npm".to_string()
}

fn default_server_args() -> Vec<String> {
    vec!["run".to_string(), "dev".to_string()]
}

/// `[ready]` section as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReadySection {
    #[serde(default = "default_ready_pattern")]
    pub pattern: String,

    #[serde(default = "default_true")]
    pub open_browser: bool,
}

impl Default for RawReadySection {
    fn default() -> Self {
        Self {
            pattern: default_ready_pattern(),
            open_browser: true,
        }
    }
}

fn default_ready_pattern() -> String {
    DEFAULT_READY_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

/// `[ready]` section after validation.
#[derive(Debug, Clone)]
pub struct ReadySection {
    pub pattern: ReadinessPattern,
    pub open_browser: bool,
}

/// `[install]` section.
///
/// If `marker` (relative to the server's working directory) does not exist,
/// `program args...` is run once, to completion, before the server starts.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_install_marker")]
    pub marker: PathBuf,

    #[serde(default = "default_server_program")]
    pub program: String,

    #[serde(default = "default_install_args")]
    pub args: Vec<String>,

    /// Same meaning as `[server].shell`.
    #[serde(default)]
    pub shell: bool,
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            enabled: true,
            marker: default_install_marker(),
            program: default_server_program(),
            args: default_install_args(),
            shell: false,
        }
    }
}

fn default_install_marker() -> PathBuf {
    PathBuf::from("node_modules")
}

fn default_install_args() -> Vec<String> {
    vec!["install".to_string()]
}

/// One `[[probe]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbeTool {
    pub name: String,

    #[serde(default = "default_probe_args")]
    pub args: Vec<String>,
}

impl ProbeTool {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_probe_args() -> Vec<String> {
    vec!["--version".to_string()]
}

fn default_probes() -> Vec<ProbeTool> {
    vec![ProbeTool::new("node", &["-v"]), ProbeTool::new("npm", &["-v"])]
}

/// `[shutdown]` section as written in TOML (durations as strings).
#[derive(Debug, Clone, Deserialize)]
pub struct RawShutdownSection {
    /// Sleep between empty polls of the watching loop.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// How long to keep relaying after a terminate request before giving up
    /// on the child acknowledging it.
    #[serde(default = "default_grace_period")]
    pub grace_period: String,

    /// Per-origin wait used by the final drain.
    #[serde(default = "default_drain_poll")]
    pub drain_poll: String,

    /// Upper bound on the whole final drain.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout: String,
}

impl Default for RawShutdownSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            grace_period: default_grace_period(),
            drain_poll: default_drain_poll(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

fn default_poll_interval() -> String {
    "50ms".to_string()
}

fn default_grace_period() -> String {
    "5s".to_string()
}

fn default_drain_poll() -> String {
    "100ms".to_string()
}

fn default_drain_timeout() -> String {
    "2s".to_string()
}

/// `[shutdown]` section after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownSection {
    pub poll_interval: std::time::Duration,
    pub grace_period: std::time::Duration,
    pub drain_poll: std::time::Duration,
    pub drain_timeout: std::time::Duration,
}
