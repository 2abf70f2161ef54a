// src/exec/browser.rs

//! Opening a URL in the user's default browser.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

/// Launch the platform's URL opener for `url` and return without waiting.
///
/// The opener is detached: we neither wait for it nor kill it on drop.
pub fn open_in_browser(url: &str) -> Result<()> {
    let mut cmd = opener_command(url);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);

    let child = cmd
        .spawn()
        .with_context(|| format!("launching browser for {url}"))?;
    debug!(pid = ?child.id(), %url, "browser opener spawned");
    Ok(())
}

fn opener_command(url: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        // The empty string is `start`'s window title argument.
        c.arg("/C").arg("start").arg("").arg(url);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    }
}
