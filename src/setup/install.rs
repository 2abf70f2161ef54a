// src/setup/install.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::InstallSection;
use crate::errors::{LaunchError, Result};
use crate::exec::SpawnSpec;
use crate::fs::FileSystem;

/// What `ensure_installed` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The marker was already there; nothing ran.
    AlreadyPresent,
    /// The install command ran and succeeded.
    Installed,
}

/// Runs the project's install command once, if its marker path is missing.
///
/// The command inherits our stdio so its progress shows up directly. A failed
/// install is reported, never retried.
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    fs: Arc<dyn FileSystem>,
    marker: PathBuf,
    command: SpawnSpec,
}

impl DependencyInstaller {
    /// `root` is the directory the marker is relative to and the command runs in.
    pub fn new(fs: Arc<dyn FileSystem>, root: &Path, section: &InstallSection) -> Self {
        Self {
            fs,
            marker: root.join(&section.marker),
            command: SpawnSpec {
                program: section.program.clone(),
                args: section.args.clone(),
                cwd: Some(root.to_path_buf()),
                shell: section.shell,
            },
        }
    }

    pub fn marker(&self) -> &Path {
        &self.marker
    }

    pub fn command(&self) -> &SpawnSpec {
        &self.command
    }

    pub fn is_installed(&self) -> bool {
        self.fs.exists(&self.marker)
    }

    pub async fn ensure_installed(&self) -> Result<InstallOutcome> {
        if self.is_installed() {
            debug!(marker = ?self.marker, "dependency marker present; skipping install");
            return Ok(InstallOutcome::AlreadyPresent);
        }

        info!(marker = ?self.marker, cmd = %self.command, "dependency marker missing; installing");

        let status = self
            .command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| LaunchError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(LaunchError::InstallFailed(format!(
                "'{}' exited with {}",
                self.command,
                status
                    .code()
                    .map(|c| format!("code {c}"))
                    .unwrap_or_else(|| "no exit code".to_string())
            )));
        }

        info!(cmd = %self.command, "dependencies installed");
        Ok(InstallOutcome::Installed)
    }
}
