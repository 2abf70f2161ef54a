// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::HumanDuration;

/// Command-line arguments for `devlaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devlaunch",
    version,
    about = "Check tools, install dependencies, start a dev server and open it once it is ready.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Devlaunch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory: where the install marker is looked up and where
    /// the server runs. Overrides `[server].cwd`.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Don't open the browser when the server reports its URL.
    #[arg(long)]
    pub no_browser: bool,

    /// Skip the dependency install step.
    #[arg(long)]
    pub skip_install: bool,

    /// Skip checking for required tools.
    #[arg(long)]
    pub skip_probe: bool,

    /// How long to wait for the server after Ctrl-C (e.g. "3s", "500ms").
    #[arg(long, value_name = "DURATION")]
    pub grace_period: Option<HumanDuration>,

    /// Resolve config and print what would run, without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Server command overriding `[server]`, e.g. `-- pnpm dev --port 3000`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
