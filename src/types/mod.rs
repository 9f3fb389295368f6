//! Core types and identifiers for the access terminal
//!
//! This module contains fundamental types, identifiers, errors and configuration
//! structures used throughout the terminal.
//!
//! # Overview
//!
//! - **Identifiers**: UUID-based unique identifiers for students and visits
//! - **Enums**: Zones, visit states and the repeat entry policy
//! - **Errors**: The access error taxonomy and storage errors
//! - **Configuration**: Terminal configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::types::*;
//!
//! let student_id = StudentId::new();
//! let zone: Zone = "feminino".parse().unwrap();
//! assert_eq!(zone, Zone::Female);
//!
//! let config = TerminalConfig {
//!     repeat_entry_policy: RepeatEntryPolicy::ReuseOpen,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! # let _ = student_id;
//! ```

pub mod config;
pub mod enums;
pub mod error;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use error::*;
pub use identifiers::*;
