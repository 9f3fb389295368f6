//! Configuration structures for the access terminal
//!
//! This module contains the terminal configuration structure, the command
//! line surface of the kiosk binary and the validation logic tying them together.

use super::RepeatEntryPolicy;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Credential generation defaults
pub mod credentials {
    /// Prefix that marks a presented string as a scan code
    pub const SCAN_CODE_PREFIX: &str = "QR-";

    /// Shortest generated passcode
    pub const MIN_PASSCODE_DIGITS: usize = 4;

    /// Longest generated passcode
    pub const MAX_PASSCODE_DIGITS: usize = 6;

    /// Upper bound accepted for configured passcode lengths
    pub const PASSCODE_DIGITS_LIMIT: usize = 12;

    /// Attempts made to find an unused credential before giving up
    pub const GENERATION_ATTEMPTS: usize = 64;

    /// Length of the fixed passcodes given to the demo students
    pub const DEMO_PASSCODE_DIGITS: usize = 6;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "restroom-access",
    version = "0.1.0",
    about = "Restroom access terminal - logs student entry and exit by scan code or passcode",
    long_about = "Runs a restroom access terminal session. Commands are read as JSON objects, one per line, from a script file or standard input, and every command produces one JSON response line on standard output.

EXAMPLES:
    # Interactive session with the sample students preloaded
    restroom-access --demo

    # Import a roster, then replay a recorded session
    restroom-access --roster turma-8b.json --script session.jsonl

    # Generate configuration template
    restroom-access --print-config > terminal.json

    # Validate configuration without running
    restroom-access --config terminal.json --dry-run

SESSION COMMANDS:
    {\"op\":\"check_in\",\"credential\":\"QR-1234567890\",\"zone\":\"male\"}
    {\"op\":\"check_out\",\"credential\":\"123456\",\"zone\":\"male\"}
    {\"op\":\"register\",\"name\":\"Ana\",\"class_label\":\"8A\",\"enrollment_number\":\"900\"}
    {\"op\":\"visits\",\"zone\":\"female\",\"class_contains\":\"8\",\"date\":\"2023-05-10\"}

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Prefix identifying scan codes
    #[arg(long, help = "Prefix that marks a credential as a scan code (default: QR-)")]
    pub scan_code_prefix: Option<String>,

    /// Minimum generated passcode length
    #[arg(long, help = "Minimum passcode length in digits")]
    pub passcode_min_digits: Option<usize>,

    /// Maximum generated passcode length
    #[arg(long, help = "Maximum passcode length in digits")]
    pub passcode_max_digits: Option<usize>,

    /// Behavior on repeated entry for an already open visit
    #[arg(
        long,
        help = "Repeat entry policy (stack or reuse_open)",
        long_help = "What to do when a student enters a zone they already have an open visit in. 'stack' records a new visit every time, 'reuse_open' hands back the open visit. Default: stack"
    )]
    pub repeat_entry_policy: Option<RepeatEntryPolicy>,

    /// Random seed for reproducible credentials
    #[arg(long, help = "Random seed for reproducible credential generation")]
    pub seed: Option<u64>,

    /// Preload the sample students
    #[arg(long, help = "Preload the sample students")]
    pub demo: bool,

    /// Roster to import before the session starts
    #[arg(long, help = "Roster JSON file to import before the session starts")]
    pub roster: Option<String>,

    /// Session script (JSON lines)
    #[arg(long, help = "Read session commands from this file instead of stdin")]
    pub script: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Directory for rolling log files
    #[arg(long, help = "Also write JSON logs to daily files in this directory")]
    pub log_dir: Option<String>,

    /// JSON console logs
    #[arg(long, help = "Emit console logs as JSON")]
    pub json_logs: bool,

    /// Dry run mode - validate configuration without running a session
    #[arg(long, help = "Validate configuration without running a session")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Prefix identifying scan codes
    pub scan_code_prefix: Option<String>,

    /// Minimum generated passcode length
    pub passcode_min_digits: Option<usize>,

    /// Maximum generated passcode length
    pub passcode_max_digits: Option<usize>,

    /// Attempts made to find an unused credential
    pub credential_attempts: Option<usize>,

    /// Behavior on repeated entry
    pub repeat_entry_policy: Option<RepeatEntryPolicy>,

    /// Random seed
    pub seed: Option<u64>,

    /// Preload the sample students
    pub demo_data: Option<bool>,

    /// Roster to import before the session starts
    pub roster: Option<String>,

    /// Session script
    pub script: Option<String>,
}

/// Configuration for the access terminal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminalConfig {
    /// Prefix identifying scan codes; everything else is a passcode
    pub scan_code_prefix: String,

    /// Minimum generated passcode length
    pub passcode_min_digits: usize,

    /// Maximum generated passcode length
    pub passcode_max_digits: usize,

    /// Attempts made to find an unused credential
    pub credential_attempts: usize,

    /// Behavior on repeated entry for an already open visit
    pub repeat_entry_policy: RepeatEntryPolicy,

    /// Random seed for reproducible credentials
    pub seed: Option<u64>,

    /// Preload the sample students
    pub demo_data: bool,

    /// Roster to import before the session starts
    pub roster: Option<String>,

    /// Session script; stdin when absent
    pub script: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for terminal configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Scan code prefix is empty
    #[error("Scan code prefix must not be empty")]
    EmptyScanCodePrefix,

    /// Scan code prefix could be mistaken for a passcode
    #[error("Scan code prefix must contain a non-digit character, got {0:?}")]
    AmbiguousScanCodePrefix(String),

    /// Passcode length range is invalid
    #[error("Invalid passcode length range: min ({0}) must be >= 1, <= max ({1}) and max <= {limit}", limit = credentials::PASSCODE_DIGITS_LIMIT)]
    InvalidPasscodeRange(usize, usize),

    /// Credential attempts is zero
    #[error("Credential attempts must be greater than 0, got {0}")]
    InvalidCredentialAttempts(usize),

    /// Scan code prefix starts or ends with whitespace, which presented input never keeps
    #[error("Scan code prefix must not start or end with whitespace, got {0:?}")]
    PaddedScanCodePrefix(String),

    /// Demo mode is on but the sample passcodes fall outside the accepted lengths
    #[error("Demo passcodes have {digits} digits, outside the configured range {0} - {1}", digits = credentials::DEMO_PASSCODE_DIGITS)]
    DemoPasscodesRejected(usize, usize),
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scan_code_prefix: credentials::SCAN_CODE_PREFIX.to_string(),
            passcode_min_digits: credentials::MIN_PASSCODE_DIGITS,
            passcode_max_digits: credentials::MAX_PASSCODE_DIGITS,
            credential_attempts: credentials::GENERATION_ATTEMPTS,
            repeat_entry_policy: RepeatEntryPolicy::Stack,
            seed: None,
            demo_data: false,
            roster: None,
            script: None,
        }
    }
}

impl TerminalConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            scan_code_prefix: config_file.scan_code_prefix.unwrap_or(defaults.scan_code_prefix),
            passcode_min_digits: config_file
                .passcode_min_digits
                .unwrap_or(defaults.passcode_min_digits),
            passcode_max_digits: config_file
                .passcode_max_digits
                .unwrap_or(defaults.passcode_max_digits),
            credential_attempts: config_file
                .credential_attempts
                .unwrap_or(defaults.credential_attempts),
            repeat_entry_policy: config_file
                .repeat_entry_policy
                .unwrap_or(defaults.repeat_entry_policy),
            seed: config_file.seed.or(defaults.seed),
            demo_data: config_file.demo_data.unwrap_or(defaults.demo_data),
            roster: config_file.roster.or(defaults.roster),
            script: config_file.script.or(defaults.script),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.scan_code_prefix {
            config.scan_code_prefix = value;
        }
        if let Some(value) = args.passcode_min_digits {
            config.passcode_min_digits = value;
        }
        if let Some(value) = args.passcode_max_digits {
            config.passcode_max_digits = value;
        }
        if let Some(value) = args.repeat_entry_policy {
            config.repeat_entry_policy = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if args.demo {
            config.demo_data = true;
        }
        if let Some(value) = args.roster {
            config.roster = Some(value);
        }
        if let Some(value) = args.script {
            config.script = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.scan_code_prefix.is_empty() {
            return Err(ConfigValidationError::EmptyScanCodePrefix);
        }

        // Presented credentials are trimmed before classification
        if self.scan_code_prefix.trim() != self.scan_code_prefix {
            return Err(ConfigValidationError::PaddedScanCodePrefix(
                self.scan_code_prefix.clone(),
            ));
        }

        // An all-digit prefix would let a passcode classify as a scan code
        if self.scan_code_prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigValidationError::AmbiguousScanCodePrefix(
                self.scan_code_prefix.clone(),
            ));
        }

        if self.passcode_min_digits == 0
            || self.passcode_min_digits > self.passcode_max_digits
            || self.passcode_max_digits > credentials::PASSCODE_DIGITS_LIMIT
        {
            return Err(ConfigValidationError::InvalidPasscodeRange(
                self.passcode_min_digits,
                self.passcode_max_digits,
            ));
        }

        if self.credential_attempts == 0 {
            return Err(ConfigValidationError::InvalidCredentialAttempts(
                self.credential_attempts,
            ));
        }

        if self.demo_data
            && !(self.passcode_min_digits..=self.passcode_max_digits)
                .contains(&credentials::DEMO_PASSCODE_DIGITS)
        {
            return Err(ConfigValidationError::DemoPasscodesRejected(
                self.passcode_min_digits,
                self.passcode_max_digits,
            ));
        }

        Ok(())
    }

    /// Get the passcode length range as a tuple
    pub fn passcode_digits(&self) -> (usize, usize) {
        (self.passcode_min_digits, self.passcode_max_digits)
    }
}
