//! Student records and the student directory
//!
//! This module contains everything about who may use the terminal: the
//! student record, credential generation, registration and roster import.
//!
//! # Overview
//!
//! - **Student**: immutable record holding identity and credentials
//! - **CredentialGenerator**: random passcodes and scan codes, seedable
//! - **StudentDirectory**: validated registration and atomic bulk import
//! - **Roster**: JSON roster files and the sample data used by demo mode
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::clock::SystemClock;
//! use restroom_access::store::MemoryStore;
//! use restroom_access::student::*;
//! use restroom_access::types::*;
//! use std::sync::Arc;
//!
//! let config = TerminalConfig::default();
//! let mut directory = StudentDirectory::new(&config, Arc::new(SystemClock));
//! let mut store = MemoryStore::new();
//!
//! let ana = directory
//!     .create_student(&mut store, NewStudent::new("Ana", "8A", "900"))
//!     .unwrap();
//! assert!(ana.scan_code.starts_with("QR-"));
//!
//! let summary = directory.import_roster(&mut store, sample_import_roster().into_rows()).unwrap();
//! assert_eq!(summary.imported, 5);
//! ```

pub mod directory;
pub mod generator;
pub mod roster;
#[allow(clippy::module_inception)]
pub mod student;

pub use directory::{ImportSummary, StudentDirectory};
pub use generator::CredentialGenerator;
pub use roster::{demo_roster, demo_visits, sample_import_roster, Roster};
pub use student::{NewStudent, Student, StudentSummary};
