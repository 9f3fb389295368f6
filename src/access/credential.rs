//! Presented credentials
//!
//! This module contains the tagged credential type and the syntactic rules
//! that turn a raw terminal input into one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AccessError, AccessResult, TerminalConfig};

/// Something a student presents at the terminal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Credential {
    /// Token read from a printed code
    ScanCode(String),
    /// Digits typed on the keypad
    Passcode(String),
}

impl Credential {
    /// Classify a raw input by prefix alone, without validating it
    ///
    /// Input starting with `scan_code_prefix` is a scan code; anything else
    /// is a passcode. Surrounding whitespace is removed.
    pub fn classify(raw: &str, scan_code_prefix: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with(scan_code_prefix) {
            Credential::ScanCode(raw.to_string())
        } else {
            Credential::Passcode(raw.to_string())
        }
    }

    /// Classify and validate a raw input
    pub fn parse(raw: &str, policy: &CredentialPolicy) -> AccessResult<Self> {
        let credential = Self::classify(raw, &policy.scan_code_prefix);
        policy.check(&credential)?;
        Ok(credential)
    }

    /// Human readable name of the credential form
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ScanCode(_) => "scan code",
            Credential::Passcode(_) => "passcode",
        }
    }

    /// The presented text
    pub fn as_str(&self) -> &str {
        match self {
            Credential::ScanCode(value) | Credential::Passcode(value) => value,
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ScanCode(value) => write!(f, "{}", value),
            // Never echo a passcode into logs
            Credential::Passcode(value) => write!(f, "{}", "*".repeat(value.len())),
        }
    }
}

/// Syntactic rules a credential must satisfy before lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPolicy {
    /// Prefix marking scan codes
    pub scan_code_prefix: String,
    /// Shortest accepted passcode
    pub min_digits: usize,
    /// Longest accepted passcode
    pub max_digits: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::from_config(&TerminalConfig::default())
    }
}

impl CredentialPolicy {
    /// Policy matching the terminal's credential settings
    pub fn from_config(config: &TerminalConfig) -> Self {
        Self {
            scan_code_prefix: config.scan_code_prefix.clone(),
            min_digits: config.passcode_min_digits,
            max_digits: config.passcode_max_digits,
        }
    }

    /// Reject empty input, a bare prefix and malformed passcodes
    pub fn check(&self, credential: &Credential) -> AccessResult<()> {
        match credential {
            Credential::ScanCode(code) => {
                let body = code.strip_prefix(self.scan_code_prefix.as_str()).unwrap_or(code);
                if body.trim().is_empty() {
                    return Err(AccessError::InvalidCredential(
                        "Código QR inválido".to_string(),
                    ));
                }
            }
            Credential::Passcode(digits) => {
                if digits.is_empty() {
                    return Err(AccessError::InvalidCredential(
                        "Informe o código QR ou a senha".to_string(),
                    ));
                }
                let length_ok = (self.min_digits..=self.max_digits).contains(&digits.len());
                if !length_ok || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AccessError::InvalidCredential(format!(
                        "A senha deve ter entre {} e {} dígitos",
                        self.min_digits, self.max_digits
                    )));
                }
            }
        }
        Ok(())
    }
}
