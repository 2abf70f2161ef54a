// src/exec/readiness.rs

//! Readiness detection: a stateless line predicate plus a one-way latch.

use std::fmt;

use regex::Regex;

/// The pattern that identifies a server's "ready" line.
///
/// If the regex has a capture group, group 1 is the captured value;
/// otherwise the whole match is.
#[derive(Clone)]
pub struct ReadinessPattern {
    regex: Regex,
}

impl ReadinessPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// First occurrence of the pattern in `line`, if any.
    pub fn capture(&self, line: &str) -> Option<String> {
        let caps = self.regex.captures(line)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        Some(m.as_str().to_string())
    }
}

impl fmt::Debug for ReadinessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadinessPattern")
            .field(&self.regex.as_str())
            .finish()
    }
}

/// Irreversible "server is ready" flag for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyMarker {
    value: Option<String>,
}

impl ReadyMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set the marker. Returns `false` (and keeps the old value) if it was
    /// already set.
    pub fn set(&mut self, value: String) -> bool {
        if self.value.is_some() {
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }
}

/// Side effect run with the captured value the moment the marker is set.
pub type ReadyCallback = Box<dyn FnOnce(&str) + Send>;
