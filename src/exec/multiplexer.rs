// src/exec/multiplexer.rs

//! Non-blocking consumption of a child's two output streams.
//!
//! One Tokio task per stream does the blocking part (read a line, push it to
//! an unbounded per-origin queue). The supervisor only ever polls the queues,
//! so a silent stream can never stall relay of the other one.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::types::{Origin, OutputLine};

/// Per-origin queue end held by the multiplexer.
#[derive(Debug)]
struct OriginQueue {
    rx: mpsc::UnboundedReceiver<OutputLine>,
    reader: JoinHandle<()>,
    /// Set once the reader has finished and the queue has been emptied.
    closed: bool,
}

impl OriginQueue {
    fn try_next(&mut self) -> Option<OutputLine> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    async fn drain(&mut self, wait: Duration) -> Option<OutputLine> {
        if self.closed {
            return None;
        }
        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.closed = true;
                None
            }
            Err(_elapsed) => None,
        }
    }
}

/// Two live output streams behind a single polling interface.
///
/// Lines within one origin come out in exactly the order they were read;
/// nothing is promised about ordering across origins.
#[derive(Debug)]
pub struct OutputMultiplexer {
    stdout: OriginQueue,
    stderr: OriginQueue,
}

impl OutputMultiplexer {
    /// Start one background reader per stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn attach<O, E>(stdout: O, stderr: E) -> Self
    where
        O: AsyncRead + Send + Unpin + 'static,
        E: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            stdout: spawn_reader(Origin::Stdout, stdout),
            stderr: spawn_reader(Origin::Stderr, stderr),
        }
    }

    /// Pop the next queued line for `origin`, if any. Never waits.
    pub fn try_next(&mut self, origin: Origin) -> Option<OutputLine> {
        self.queue_mut(origin).try_next()
    }

    /// Wait up to `wait` for the next line of `origin`.
    ///
    /// Returns immediately with `None` once the origin is closed and empty.
    /// Only meant for the shutdown drain.
    pub async fn drain(&mut self, origin: Origin, wait: Duration) -> Option<OutputLine> {
        self.queue_mut(origin).drain(wait).await
    }

    /// True once `origin`'s reader has finished and every line it produced
    /// has been handed out.
    pub fn is_closed(&self, origin: Origin) -> bool {
        match origin {
            Origin::Stdout => self.stdout.closed,
            Origin::Stderr => self.stderr.closed,
        }
    }

    /// True once both origins are closed.
    pub fn is_exhausted(&self) -> bool {
        Origin::ALL.iter().all(|o| self.is_closed(*o))
    }

    fn queue_mut(&mut self, origin: Origin) -> &mut OriginQueue {
        match origin {
            Origin::Stdout => &mut self.stdout,
            Origin::Stderr => &mut self.stderr,
        }
    }
}

impl Drop for OutputMultiplexer {
    fn drop(&mut self) {
        // A grandchild can keep a pipe open after the child is gone; don't let
        // its reader outlive the run.
        self.stdout.reader.abort();
        self.stderr.reader.abort();
    }
}

fn spawn_reader<R>(origin: Origin, stream: R) -> OriginQueue
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<OutputLine>();
    let reader = tokio::spawn(read_lines(origin, stream, tx));
    OriginQueue {
        rx,
        reader,
        closed: false,
    }
}

/// Reader loop: one line in, one `OutputLine` out, until EOF or a read error.
///
/// Dropping `tx` on exit is the "closed" marker the consumer observes.
async fn read_lines<R>(origin: Origin, stream: R, tx: mpsc::UnboundedSender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut sequence: u64 = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                debug!(%origin, lines = sequence, "stream reached end of file");
                break;
            }
            Ok(_) => {
                let line = OutputLine {
                    origin,
                    text: decode_line(&buf),
                    sequence,
                };
                trace!(%origin, sequence, "queued line");
                sequence += 1;
                if tx.send(line).is_err() {
                    debug!(%origin, "multiplexer dropped; reader stopping");
                    break;
                }
            }
            Err(e) => {
                debug!(%origin, error = %e, "read error; treating stream as closed");
                break;
            }
        }
    }
}

/// Lossy UTF-8 decode with the line terminator (`\n` or `\r\n`) removed.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
