// src/exec/sink.rs

use std::io::Write;

use crate::types::Origin;

/// Consumer of relayed output lines.
///
/// Called inline by the supervisor's polling loop, so a slow sink slows the
/// relay down; nothing is buffered beyond the multiplexer's queues.
pub trait OutputSink: Send {
    fn relay(&mut self, origin: Origin, text: &str);
}

/// Writes stdout lines to our stdout and stderr lines to our stderr,
/// verbatim, flushing after every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSink;

impl OutputSink for StdioSink {
    fn relay(&mut self, origin: Origin, text: &str) {
        // A closed terminal is not worth aborting supervision over.
        let _ = match origin {
            Origin::Stdout => write_line(std::io::stdout().lock(), text),
            Origin::Stderr => write_line(std::io::stderr().lock(), text),
        };
    }
}

fn write_line(mut out: impl Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}
