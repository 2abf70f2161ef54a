#![allow(dead_code)]

use devlaunch::config::{ConfigFile, ProbeTool, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn server(mut self, program: &str, args: &[&str]) -> Self {
        self.config.server.program = program.to_string();
        self.config.server.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn shell(mut self, val: bool) -> Self {
        self.config.server.shell = val;
        self
    }

    pub fn cwd(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.server.cwd = Some(dir.into());
        self
    }

    pub fn ready_pattern(mut self, pattern: &str) -> Self {
        self.config.ready.pattern = pattern.to_string();
        self
    }

    pub fn open_browser(mut self, val: bool) -> Self {
        self.config.ready.open_browser = val;
        self
    }

    pub fn install(mut self, marker: &str, program: &str, args: &[&str]) -> Self {
        self.config.install.enabled = true;
        self.config.install.marker = marker.into();
        self.config.install.program = program.to_string();
        self.config.install.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn no_install(mut self) -> Self {
        self.config.install.enabled = false;
        self
    }

    pub fn no_probes(mut self) -> Self {
        self.config.probe.clear();
        self
    }

    pub fn probe(mut self, name: &str, args: &[&str]) -> Self {
        self.config.probe.push(ProbeTool::new(name, args));
        self
    }

    pub fn grace_period(mut self, val: &str) -> Self {
        self.config.shutdown.grace_period = val.to_string();
        self
    }

    pub fn poll_interval(mut self, val: &str) -> Self {
        self.config.shutdown.poll_interval = val.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
