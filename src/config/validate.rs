// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, ReadySection, ShutdownSection};
use crate::errors::{LaunchError, Result};
use crate::exec::ReadinessPattern;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::LaunchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_commands(&raw)?;
        validate_probes(&raw)?;
        let ready = validate_ready(&raw)?;
        let shutdown = validate_shutdown(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.server,
            ready,
            raw.install,
            raw.probe,
            shutdown,
        ))
    }
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.program.trim().is_empty() {
        return Err(LaunchError::ConfigError(
            "[server].program must not be empty".to_string(),
        ));
    }

    if cfg.install.enabled && cfg.install.program.trim().is_empty() {
        return Err(LaunchError::ConfigError(
            "[install].program must not be empty when install is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_probes(cfg: &RawConfigFile) -> Result<()> {
    for tool in cfg.probe.iter() {
        if tool.name.trim().is_empty() {
            return Err(LaunchError::ConfigError(
                "[[probe]] entries must have a non-empty name".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_ready(cfg: &RawConfigFile) -> Result<ReadySection> {
    let pattern = ReadinessPattern::new(&cfg.ready.pattern).map_err(|e| {
        LaunchError::ConfigError(format!(
            "[ready].pattern is not a valid regex ({}): {}",
            cfg.ready.pattern, e
        ))
    })?;

    Ok(ReadySection {
        pattern,
        open_browser: cfg.ready.open_browser,
    })
}

fn validate_shutdown(cfg: &RawConfigFile) -> Result<ShutdownSection> {
    let s = &cfg.shutdown;
    let shutdown = ShutdownSection {
        poll_interval: duration_field("poll_interval", &s.poll_interval)?,
        grace_period: duration_field("grace_period", &s.grace_period)?,
        drain_poll: duration_field("drain_poll", &s.drain_poll)?,
        drain_timeout: duration_field("drain_timeout", &s.drain_timeout)?,
    };

    // A zero poll interval would turn the watching loop into a busy spin.
    if shutdown.poll_interval.is_zero() {
        return Err(LaunchError::ConfigError(
            "[shutdown].poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(shutdown)
}

fn duration_field(name: &str, value: &str) -> Result<std::time::Duration> {
    parse_duration(value).map_err(|e| {
        LaunchError::ConfigError(format!("[shutdown].{} = {:?}: {}", name, value, e))
    })
}
