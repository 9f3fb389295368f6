//! Credential handling and access verification
//!
//! This module decides who is at the terminal and whether they may use the
//! zone they are standing at.
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::access::*;
//! use restroom_access::store::{MemoryStore, StudentRepository};
//! use restroom_access::student::demo_roster;
//! use restroom_access::types::Zone;
//! use chrono::Utc;
//!
//! let mut store = MemoryStore::new();
//! for student in demo_roster(Utc::now()) {
//!     store.insert_student(student).unwrap();
//! }
//!
//! let verifier = AccessVerifier::default();
//! let credential = verifier.parse("QR-1122334455").unwrap();
//! assert_eq!(credential.kind(), "scan code");
//!
//! let student = verifier.verify(&store, &credential, Zone::Male).unwrap();
//! assert_eq!(student.name, "Pedro Santos");
//! ```

pub mod credential;
pub mod verifier;

pub use credential::{Credential, CredentialPolicy};
pub use verifier::AccessVerifier;
