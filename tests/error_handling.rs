// tests/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use devlaunch::config::load_and_validate;
use devlaunch::errors::LaunchError;

#[test]
fn test_bad_regex_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[ready]
pattern = 'Local:\s+(http'
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(LaunchError::ConfigError(msg)) => {
            assert!(msg.contains("[ready].pattern"));
            assert!(msg.contains("Local:"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_install_program_only_matters_when_enabled() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[install]
program = ""
"#
    )
    .unwrap();
    assert!(matches!(
        load_and_validate(file.path()),
        Err(LaunchError::ConfigError(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[install]
enabled = false
program = ""
"#
    )
    .unwrap();
    assert!(load_and_validate(file.path()).is_ok());
}

#[test]
fn test_nameless_probe_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[probe]]
name = ""
"#
    )
    .unwrap();

    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(LaunchError::ConfigError(ref msg)) if msg.contains("probe")));
}

#[test]
fn test_wrong_field_type_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
args = "run dev"
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(LaunchError::TomlError(_))
    ));
}

#[test]
fn test_error_messages_are_readable() {
    let err = LaunchError::ToolMissing("node, npm".to_string());
    assert_eq!(err.to_string(), "Required tool not available: node, npm");

    let err = LaunchError::Spawn {
        program: "npm".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };
    assert_eq!(err.to_string(), "failed to spawn 'npm': not found");
    assert!(std::error::Error::source(&err).is_some());
}
