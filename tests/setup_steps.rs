// tests/setup_steps.rs
//
// Tool probing and the one-shot dependency install.

mod common;
use crate::common::{ConfigFileBuilder, init_tracing};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use devlaunch::config::{InstallSection, ProbeTool};
use devlaunch::errors::LaunchError;
use devlaunch::fs::mock::MockFileSystem;
use devlaunch::fs::{FileSystem, RealFileSystem};
use devlaunch::setup::{DependencyInstaller, InstallOutcome, ToolProbe};

type TestResult = Result<(), Box<dyn Error>>;

fn install_section(program: &str, args: &[&str]) -> InstallSection {
    ConfigFileBuilder::new()
        .install("node_modules", program, args)
        .build()
        .install
}

#[tokio::test]
async fn present_marker_skips_install() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/project/node_modules/react");

    // The command would fail if it ran.
    let section = install_section("devlaunch-definitely-not-a-real-binary", &[]);
    let installer = DependencyInstaller::new(Arc::new(fs), Path::new("/project"), &section);

    assert_eq!(installer.marker(), Path::new("/project/node_modules"));
    assert!(installer.is_installed());
    assert_eq!(installer.ensure_installed().await?, InstallOutcome::AlreadyPresent);

    Ok(())
}

#[tokio::test]
async fn install_command_runs_in_project_root() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/elsewhere/node_modules");

    let section = install_section("npm", &["install"]);
    let installer = DependencyInstaller::new(Arc::new(fs), Path::new("/project"), &section);

    assert!(!installer.is_installed());
    assert_eq!(installer.command().command_line(), "npm install");
    assert_eq!(
        installer.command().cwd.as_deref(),
        Some(Path::new("/project"))
    );

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn missing_marker_runs_install_once() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let section = install_section("sh", &["-c", "mkdir node_modules"]);
    let installer = DependencyInstaller::new(Arc::new(RealFileSystem), dir.path(), &section);

    assert_eq!(installer.ensure_installed().await?, InstallOutcome::Installed);
    assert!(RealFileSystem.exists(&dir.path().join("node_modules")));

    // Second call sees the marker and does nothing (mkdir would fail now).
    assert_eq!(installer.ensure_installed().await?, InstallOutcome::AlreadyPresent);

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_install_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let section = install_section("sh", &["-c", "exit 7"]);
    let installer = DependencyInstaller::new(Arc::new(RealFileSystem), dir.path(), &section);

    let err = installer.ensure_installed().await.unwrap_err();
    assert!(matches!(err, LaunchError::InstallFailed(ref msg) if msg.contains("code 7")));

    Ok(())
}

#[tokio::test]
async fn unspawnable_install_is_a_spawn_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let section = install_section("devlaunch-definitely-not-a-real-binary", &[]);
    let installer = DependencyInstaller::new(Arc::new(RealFileSystem), dir.path(), &section);

    let err = installer.ensure_installed().await.unwrap_err();
    assert!(matches!(err, LaunchError::Spawn { ref program, .. } if program == "devlaunch-definitely-not-a-real-binary"));

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn probe_distinguishes_present_failing_and_missing_tools() -> TestResult {
    init_tracing();

    let probe = ToolProbe::new();
    let ok = ProbeTool::new("sh", &["-c", "echo 1.0.0"]);
    let failing = ProbeTool::new("sh", &["-c", "exit 1"]);
    let missing = ProbeTool::new("devlaunch-definitely-not-a-real-binary", &["-v"]);

    assert!(probe.is_available(&ok).await);
    assert!(!probe.is_available(&failing).await);
    assert!(!probe.is_available(&missing).await);

    let names = probe
        .missing(&[ok, missing.clone(), ProbeTool::new("true", &[])])
        .await;
    assert_eq!(names, vec![missing.name]);

    Ok(())
}
