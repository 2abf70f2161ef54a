// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only conditions that abort a launch live here. Things that merely colour
//! the outcome of a supervised run (no readiness line, a slow shutdown) are
//! reported through [`crate::exec::RunReport`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Required tool not available: {0}")]
    ToolMissing(String),

    #[error("Dependency installation failed: {0}")]
    InstallFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LaunchError>;
