//! Tests for CLI argument parsing functionality
//!
//! These tests verify that command line arguments are properly parsed and
//! merged over configuration files and defaults.

use clap::Parser;
use restroom_access::types::config::{CliArgs, ConfigError, ConfigValidationError, TerminalConfig};
use restroom_access::RepeatEntryPolicy;
use std::fs;
use tempfile::TempDir;

/// Test parsing with no arguments at all
#[test]
fn test_defaults_when_no_arguments() {
    let args = CliArgs::try_parse_from(["restroom-access"]).unwrap();
    assert!(args.config.is_none());
    assert!(!args.demo);
    assert!(!args.verbose);
    assert!(args.script.is_none());

    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert_eq!(config, TerminalConfig::default());
}

/// Test parsing of the credential options
#[test]
fn test_credential_arguments() {
    let args = CliArgs::try_parse_from([
        "restroom-access",
        "--scan-code-prefix",
        "TAG:",
        "--passcode-min-digits",
        "5",
        "--passcode-max-digits",
        "8",
        "--seed",
        "42",
    ])
    .unwrap();

    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert_eq!(config.scan_code_prefix, "TAG:");
    assert_eq!(config.passcode_digits(), (5, 8));
    assert_eq!(config.seed, Some(42));
    config.validate().unwrap();
}

/// Test the repeat entry policy values
#[test]
fn test_repeat_entry_policy_argument() {
    let args = CliArgs::try_parse_from(["restroom-access", "--repeat-entry-policy", "reuse_open"]).unwrap();
    assert_eq!(args.repeat_entry_policy, Some(RepeatEntryPolicy::ReuseOpen));

    let args = CliArgs::try_parse_from(["restroom-access", "--repeat-entry-policy", "stack"]).unwrap();
    assert_eq!(args.repeat_entry_policy, Some(RepeatEntryPolicy::Stack));

    assert!(CliArgs::try_parse_from(["restroom-access", "--repeat-entry-policy", "sometimes"]).is_err());
}

/// Test session and logging flags
#[test]
fn test_session_and_logging_flags() {
    let args = CliArgs::try_parse_from([
        "restroom-access",
        "--demo",
        "--roster",
        "turma.json",
        "--script",
        "session.jsonl",
        "-v",
        "--log-dir",
        "logs",
        "--json-logs",
        "--dry-run",
    ])
    .unwrap();

    assert!(args.verbose);
    assert!(!args.debug);
    assert!(args.json_logs);
    assert!(args.dry_run);
    assert_eq!(args.log_dir.as_deref(), Some("logs"));

    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert!(config.demo_data);
    assert_eq!(config.roster.as_deref(), Some("turma.json"));
    assert_eq!(config.script.as_deref(), Some("session.jsonl"));
}

/// Test that CLI arguments take precedence over the config file
#[test]
fn test_cli_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("terminal.json");
    fs::write(
        &path,
        r#"{"scan_code_prefix": "QR:", "passcode_min_digits": 6, "repeat_entry_policy": "reuse_open", "seed": 9}"#,
    )
    .unwrap();
    let path = path.to_str().unwrap();

    let from_file = TerminalConfig::from_cli_args(CliArgs::try_parse_from(["restroom-access", "-c", path]).unwrap()).unwrap();
    assert_eq!(from_file.scan_code_prefix, "QR:");
    assert_eq!(from_file.passcode_digits(), (6, 6));
    assert_eq!(from_file.repeat_entry_policy, RepeatEntryPolicy::ReuseOpen);
    assert_eq!(from_file.seed, Some(9));

    let overridden = TerminalConfig::from_cli_args(
        CliArgs::try_parse_from(["restroom-access", "--config", path, "--seed", "10", "--repeat-entry-policy", "stack"])
            .unwrap(),
    )
    .unwrap();
    assert_eq!(overridden.scan_code_prefix, "QR:");
    assert_eq!(overridden.seed, Some(10));
    assert_eq!(overridden.repeat_entry_policy, RepeatEntryPolicy::Stack);
}

/// Test configuration file errors
#[test]
fn test_config_file_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(TerminalConfig::from_file(&missing), Err(ConfigError::FileNotFound(_))));

    let toml = dir.path().join("terminal.toml");
    fs::write(&toml, "seed = 1").unwrap();
    assert!(matches!(TerminalConfig::from_file(&toml), Err(ConfigError::UnsupportedFormat(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{").unwrap();
    assert!(matches!(TerminalConfig::from_file(&broken), Err(ConfigError::JsonError(_))));
}

/// Test that saved configuration loads back unchanged
#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.json");
    let config = TerminalConfig {
        scan_code_prefix: "ID-".to_string(),
        seed: Some(3),
        demo_data: true,
        ..Default::default()
    };

    config.save_to_file(&path).unwrap();
    assert_eq!(TerminalConfig::from_file(&path).unwrap(), config);
}

/// Test validation of CLI supplied values
#[test]
fn test_invalid_arguments_fail_validation() {
    let args = CliArgs::try_parse_from(["restroom-access", "--passcode-min-digits", "7"]).unwrap();
    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidPasscodeRange(7, 6))));

    let args = CliArgs::try_parse_from(["restroom-access", "--scan-code-prefix", "99"]).unwrap();
    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::AmbiguousScanCodePrefix(_))
    ));

    assert!(CliArgs::try_parse_from(["restroom-access", "--seed", "abc"]).is_err());
}

/// Test that a prefix padded with whitespace is refused
#[test]
fn test_padded_scan_code_prefix_fails_validation() {
    let args = CliArgs::try_parse_from(["restroom-access", "--scan-code-prefix", "QR- "]).unwrap();
    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::PaddedScanCodePrefix(ref prefix)) if prefix == "QR- "
    ));
}

/// Test that demo mode requires the sample passcode length to be accepted
#[test]
fn test_demo_with_short_passcodes_fails_validation() {
    let args = CliArgs::try_parse_from(["restroom-access", "--demo", "--passcode-max-digits", "5"]).unwrap();
    let config = TerminalConfig::from_cli_args(args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::DemoPasscodesRejected(4, 5))
    ));

    let args = CliArgs::try_parse_from(["restroom-access", "--demo", "--passcode-min-digits", "6"]).unwrap();
    TerminalConfig::from_cli_args(args).unwrap().validate().unwrap();
}
