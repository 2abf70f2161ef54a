// src/setup/mod.rs

//! One-shot steps that run before the dev server is supervised.
//!
//! - [`probe`] checks that the external tools we shell out to exist.
//! - [`install`] installs project dependencies when their marker is missing.

pub mod install;
pub mod probe;

pub use install::{DependencyInstaller, InstallOutcome};
pub use probe::ToolProbe;
