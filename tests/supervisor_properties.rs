// tests/supervisor_properties.rs
mod common;
use crate::common::{FakeLauncher, OnTerminate, ReadyCalls, RecordingSink, fast_options};

use std::io::Cursor;
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::oneshot;

use devlaunch::exec::{OutputMultiplexer, ProcessSupervisor, RunHooks, RunResult, SpawnSpec};
use devlaunch::types::Origin;

const READY: &str = "Local:   http://localhost:5173/";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("building test runtime")
}

// Printable lines without line terminators.
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :/._-]{0,40}"
}

// Lines where roughly one in eight is the ready banner.
fn log_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![7 => line_strategy(), 1 => Just(READY.to_string())],
        0..40,
    )
}

fn to_bytes(lines: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in lines {
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
    bytes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every line on each origin comes out once, in order, with a strictly
    /// increasing sequence, however the two origins interleave.
    #[test]
    fn multiplexer_delivers_each_origin_exactly_once_in_order(
        out in proptest::collection::vec(line_strategy(), 0..60),
        err in proptest::collection::vec(line_strategy(), 0..60),
        pattern in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let rt = runtime();
        let (got_out, got_err) = rt.block_on(async {
            let mut mux = OutputMultiplexer::attach(
                Cursor::new(to_bytes(&out)),
                Cursor::new(to_bytes(&err)),
            );
            let mut got_out = Vec::new();
            let mut got_err = Vec::new();
            let mut choices = pattern.iter().cycle();

            while !mux.is_exhausted() {
                // Arbitrary polling order between the two origins.
                let origin = if *choices.next().unwrap_or(&true) { Origin::Stdout } else { Origin::Stderr };
                match mux.drain(origin, Duration::from_millis(10)).await {
                    Some(line) if origin == Origin::Stdout => got_out.push(line),
                    Some(line) => got_err.push(line),
                    None => {
                        let other = if origin == Origin::Stdout { Origin::Stderr } else { Origin::Stdout };
                        if let Some(line) = mux.drain(other, Duration::from_millis(10)).await {
                            if other == Origin::Stdout { got_out.push(line) } else { got_err.push(line) }
                        }
                    }
                }
            }
            (got_out, got_err)
        });

        prop_assert_eq!(got_out.iter().map(|l| l.text.clone()).collect::<Vec<_>>(), out);
        prop_assert_eq!(got_err.iter().map(|l| l.text.clone()).collect::<Vec<_>>(), err);
        for (i, l) in got_out.iter().enumerate() {
            prop_assert_eq!(l.sequence, i as u64);
            prop_assert_eq!(l.origin, Origin::Stdout);
        }
        for (i, l) in got_err.iter().enumerate() {
            prop_assert_eq!(l.sequence, i as u64);
            prop_assert_eq!(l.origin, Origin::Stderr);
        }
    }

    /// The callback fires exactly once if any relayed line matches, never
    /// otherwise, and always with the first match.
    #[test]
    fn readiness_callback_fires_iff_some_line_matches(
        out in log_strategy(),
        err in log_strategy(),
    ) {
        let rt = runtime();
        let (report, calls, sink) = rt.block_on(async {
            let (launcher, mut control) = FakeLauncher::new(OnTerminate::Ignore);
            let supervisor = ProcessSupervisor::new(launcher, fast_options());
            let sink = RecordingSink::new();
            let calls = ReadyCalls::new();

            let supervision = supervisor
                .start(
                    &SpawnSpec::new("fake"),
                    RunHooks::new(sink.clone()).on_ready(calls.callback()),
                )
                .expect("fake launch succeeds");
            let (_cancel_tx, cancel_rx) = oneshot::channel();
            let run = tokio::spawn(supervision.run(cancel_rx));

            for line in out.iter() {
                control.stdout_line(line).await.expect("write stdout");
            }
            for line in err.iter() {
                control.stderr_line(line).await.expect("write stderr");
            }
            control.close_streams();

            // Only exit once everything has been relayed while still watching.
            tokio::time::timeout(Duration::from_secs(5), sink.wait_for(out.len() + err.len()))
                .await
                .expect("all lines relayed");
            control.exit(Some(0));

            let report = run.await.expect("supervision task");
            (report, calls, sink)
        });

        let any_match = out.iter().chain(err.iter()).any(|l| l == READY);
        prop_assert_eq!(calls.count(), usize::from(any_match));
        if any_match {
            prop_assert_eq!(calls.values(), vec!["http://localhost:5173/".to_string()]);
            prop_assert_eq!(report.ready_url.as_deref(), Some("http://localhost:5173/"));
        } else {
            prop_assert_eq!(report.ready_url, None);
        }
        prop_assert_eq!(report.result, RunResult::Completed { exit_code: Some(0) });
        prop_assert_eq!(sink.texts(Origin::Stdout), out);
        prop_assert_eq!(sink.texts(Origin::Stderr), err);
    }
}
