// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod setup;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::errors::{LaunchError, Result};
use crate::exec::{
    ProcessSupervisor, RealProcessLauncher, RunHooks, RunReport, RunResult, SpawnSpec,
    StdioSink, SupervisionNote, open_in_browser,
};
use crate::fs::RealFileSystem;
use crate::setup::{DependencyInstaller, InstallOutcome, ToolProbe};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - tool probing
/// - dependency installation
/// - dev server supervision with Ctrl-C cancellation
///
/// Returns the exit code the process should end with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    apply_cli_overrides(&mut cfg, &args);

    let root = project_root(&cfg);
    let spec = cfg.spawn_spec();

    if args.dry_run {
        print_dry_run(&cfg, &root, &spec, &args);
        return Ok(0);
    }

    println!("--- devlaunch ---");

    if !args.skip_probe {
        check_tools(&cfg).await?;
    }

    if !args.skip_install && cfg.install.enabled {
        let installer = DependencyInstaller::new(Arc::new(RealFileSystem), &root, &cfg.install);
        match installer.ensure_installed().await? {
            InstallOutcome::AlreadyPresent => println!(
                "✅ '{}' found. Skipping dependency installation.",
                cfg.install.marker.display()
            ),
            InstallOutcome::Installed => println!("✅ Dependencies installed successfully."),
        }
    }

    println!("\n🚀 Starting {spec} ...");

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

    // Ctrl-C → terminate the server, keep relaying until it is gone.
    let ctrl_c = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        println!("\n🛑 Shutting down the server.");
        let _ = cancel_tx.send(());
    });

    let open_browser = cfg.ready.open_browser;
    let hooks = RunHooks::new(StdioSink).on_ready(move |url| {
        println!("\n🌐 Server is running at {url}");
        if open_browser {
            println!("Opening in your default browser...");
            if let Err(e) = open_in_browser(url) {
                warn!(%url, error = %e, "could not open browser");
            }
        }
    });

    let supervisor = ProcessSupervisor::new(RealProcessLauncher, cfg.supervisor_options());
    let report = supervisor.supervise(&spec, hooks, cancel_rx).await;
    ctrl_c.abort();

    print_summary(&report);
    Ok(exit_code_for(&report.result))
}

/// Process exit code for a finished run.
pub fn exit_code_for(result: &RunResult) -> i32 {
    match result {
        RunResult::TerminatedByCaller { .. } => 0,
        RunResult::Completed { exit_code } => exit_code.unwrap_or(1),
        RunResult::CrashedEarly { .. } => 1,
    }
}

fn apply_cli_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some((program, rest)) = args.command.split_first() {
        cfg.server.program = program.clone();
        cfg.server.args = rest.to_vec();
    }
    if let Some(ref dir) = args.cwd {
        cfg.server.cwd = Some(dir.clone());
    }
    if args.no_browser {
        cfg.ready.open_browser = false;
    }
    if let Some(grace) = args.grace_period {
        cfg.shutdown.grace_period = grace.0;
    }
}

/// Directory the install marker is relative to: the server's cwd, or ours.
fn project_root(cfg: &ConfigFile) -> PathBuf {
    match cfg.server.cwd {
        Some(ref dir) if !dir.as_os_str().is_empty() => dir.clone(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

async fn check_tools(cfg: &ConfigFile) -> Result<()> {
    println!("\nChecking environment...");
    let missing = ToolProbe::new().missing(&cfg.probe).await;

    for tool in cfg.probe.iter() {
        if missing.contains(&tool.name) {
            println!("❌ {} not found.", tool.name);
        } else {
            println!("✅ {} is installed.", tool.name);
        }
    }

    if !missing.is_empty() {
        return Err(LaunchError::ToolMissing(missing.join(", ")));
    }
    info!(tools = cfg.probe.len(), "all required tools available");
    Ok(())
}

/// One-time end-of-run summary.
fn print_summary(report: &RunReport) {
    println!();
    match report.result {
        RunResult::TerminatedByCaller { .. } => println!("👋 Server {}.", report.result),
        RunResult::Completed { .. } | RunResult::CrashedEarly { .. } => {
            println!("❌ Server {}.", report.result)
        }
    }

    if let Some(ref url) = report.ready_url {
        println!("   Was serving at {url}");
    }
    for note in report.notes.iter() {
        match note {
            SupervisionNote::ReadinessNotDetected => {
                println!("⚠️  The server never reported a URL.");
            }
            SupervisionNote::TerminationTimeout { grace } => {
                println!("⚠️  Server did not stop within {grace:?}; it may still be running.");
            }
        }
    }
    debug!(
        stdout_lines = report.relayed.stdout,
        stderr_lines = report.relayed.stderr,
        "run summary printed"
    );
}

/// Dry-run output: print what would be checked, installed and launched.
fn print_dry_run(cfg: &ConfigFile, root: &Path, spec: &SpawnSpec, args: &CliArgs) {
    println!("devlaunch dry-run");
    println!();

    if args.skip_probe {
        println!("probe: skipped");
    } else {
        println!("probe ({}):", cfg.probe.len());
        for tool in cfg.probe.iter() {
            println!("  - {} {}", tool.name, tool.args.join(" "));
        }
    }

    if args.skip_install || !cfg.install.enabled {
        println!("install: skipped");
    } else {
        println!("install:");
        println!("  marker: {}", root.join(&cfg.install.marker).display());
        println!(
            "  cmd: {} {}",
            cfg.install.program,
            cfg.install.args.join(" ")
        );
    }

    println!("server:");
    println!("  cmd: {spec}");
    if let Some(ref dir) = spec.cwd {
        println!("  cwd: {}", dir.display());
    }
    if spec.shell {
        println!("  shell: true");
    }
    println!("  ready pattern: {}", cfg.ready.pattern.as_str());
    println!("  open_browser: {}", cfg.ready.open_browser);
    println!("  poll_interval: {:?}", cfg.shutdown.poll_interval);
    println!("  grace_period: {:?}", cfg.shutdown.grace_period);
    println!(
        "  drain: {:?} per poll, {:?} total",
        cfg.shutdown.drain_poll, cfg.shutdown.drain_timeout
    );

    debug!("dry-run complete (no execution)");
}
