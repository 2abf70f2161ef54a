// src/config/mod.rs

//! Configuration loading and validation for devlaunch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Turn the raw model into a validated one (`validate.rs`): compiled
//!   readiness regex, parsed durations, non-empty commands.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, DEFAULT_READY_PATTERN, InstallSection, ProbeTool, RawConfigFile, RawReadySection,
    RawShutdownSection, ReadySection, ServerSection, ShutdownSection,
};
