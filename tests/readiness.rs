// tests/readiness.rs
//
// Pattern matching, the ready latch and the small value types around them.

use std::time::Duration;

use devlaunch::exec::{ReadinessPattern, ReadyMarker, RunResult, SpawnSpec};
use devlaunch::exit_code_for;
use devlaunch::types::{HumanDuration, Origin, parse_duration};

fn vite() -> ReadinessPattern {
    ReadinessPattern::new(devlaunch::config::DEFAULT_READY_PATTERN).unwrap()
}

#[test]
fn vite_banner_yields_url() {
    let p = vite();
    assert_eq!(
        p.capture("  ➜  Local:   http://localhost:5173/").as_deref(),
        Some("http://localhost:5173/")
    );
    assert_eq!(
        p.capture("Local: https://127.0.0.1:4000/ (ctrl+c to stop)").as_deref(),
        Some("https://127.0.0.1:4000/")
    );
}

#[test]
fn near_misses_do_not_match() {
    let p = vite();
    assert_eq!(p.capture("  ➜  Network: use --host to expose"), None);
    assert_eq!(p.capture("Local: http://localhost/"), None);
    assert_eq!(p.capture("Local:http://localhost:5173"), None);
    assert_eq!(p.capture(""), None);
}

#[test]
fn pattern_without_group_yields_whole_match() {
    let p = ReadinessPattern::new(r"listening on port \d+").unwrap();
    assert_eq!(
        p.capture("server listening on port 8080!").as_deref(),
        Some("listening on port 8080")
    );
    assert_eq!(p.as_str(), r"listening on port \d+");
}

#[test]
fn only_first_occurrence_in_a_line_counts() {
    let p = ReadinessPattern::new(r"port (\d+)").unwrap();
    assert_eq!(p.capture("port 1 then port 2").as_deref(), Some("1"));
}

#[test]
fn invalid_pattern_is_rejected() {
    assert!(ReadinessPattern::new("Local:(").is_err());
}

#[test]
fn marker_is_set_at_most_once() {
    let mut marker = ReadyMarker::new();
    assert!(!marker.is_set());
    assert_eq!(marker.value(), None);

    assert!(marker.set("http://localhost:5173/".to_string()));
    assert!(!marker.set("http://localhost:9999/".to_string()));

    assert!(marker.is_set());
    assert_eq!(marker.value(), Some("http://localhost:5173/"));
    assert_eq!(marker.into_value().as_deref(), Some("http://localhost:5173/"));
}

#[test]
fn exit_codes_follow_run_result() {
    assert_eq!(exit_code_for(&RunResult::TerminatedByCaller { exit_code: None }), 0);
    assert_eq!(exit_code_for(&RunResult::TerminatedByCaller { exit_code: Some(143) }), 0);
    assert_eq!(exit_code_for(&RunResult::Completed { exit_code: Some(0) }), 0);
    assert_eq!(exit_code_for(&RunResult::Completed { exit_code: Some(2) }), 2);
    assert_eq!(exit_code_for(&RunResult::Completed { exit_code: None }), 1);
    assert_eq!(
        exit_code_for(&RunResult::CrashedEarly { reason: "boom".to_string() }),
        1
    );
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 5s "), Ok(Duration::from_secs(5)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("ms").is_err());

    // Too large for the unit multiplier: an error, not an overflow.
    assert_eq!(
        parse_duration(&format!("{}s", u64::MAX)),
        Ok(Duration::from_secs(u64::MAX))
    );
    assert!(parse_duration(&format!("{}m", u64::MAX / 59)).is_err());
    assert!(parse_duration(&format!("{}h", u64::MAX)).is_err());

    let d: HumanDuration = "750ms".parse().unwrap();
    assert_eq!(d, HumanDuration(Duration::from_millis(750)));
}

#[test]
fn spawn_spec_renders_as_command_line() {
    let spec = SpawnSpec::new("npm").args(["run", "dev"]);
    assert_eq!(spec.command_line(), "npm run dev");
    assert_eq!(spec.to_string(), "npm run dev");
    assert!(!spec.shell);
    assert_eq!(spec.cwd, None);
}

#[test]
fn origin_names() {
    assert_eq!(Origin::Stdout.to_string(), "stdout");
    assert_eq!(Origin::Stderr.as_str(), "stderr");
    assert_eq!(Origin::ALL, [Origin::Stdout, Origin::Stderr]);
}
