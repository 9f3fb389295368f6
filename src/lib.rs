//! Restroom Access Terminal
//!
//! A school restroom access terminal: students identify themselves with a
//! scanned code or a numeric passcode to log entry to and exit from a
//! restroom, and administrators register students, import class rosters and
//! review the visit history.
//!
//! # Overview
//!
//! The heart of the library is the visit lifecycle. An entry opens a visit,
//! an exit closes the most recent open one and records how long it lasted.
//! A student may never be inside both restrooms at once.
//!
//! ## Key Features
//!
//! - **Credential Verification**: Scan codes and passcodes resolved against the directory
//! - **Visit Ledger**: Entry and exit registration with duration tracking
//! - **Student Directory**: Registration with generated credentials and atomic roster import
//! - **Repository Traits**: Core logic written against traits, with an in-memory store
//! - **Session Protocol**: JSON-lines command stream driving a terminal
//!
//! ## Quick Start
//!
//! ```rust
//! use restroom_access::*;
//!
//! let terminal = AccessTerminal::new(TerminalConfig::default(), MemoryStore::new());
//! let ana = terminal.register_student(NewStudent::new("Ana", "8A", "900"))?;
//!
//! terminal.check_in(&ana.scan_code, Zone::Female)?;
//! let open = terminal.visits(&VisitFilter::new().with_zone(Zone::Female).open_only())?;
//! assert_eq!(open.len(), 1);
//!
//! terminal.check_out(&ana.passcode, Zone::Female)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, zones, errors and configuration
//! - [`clock`]: Time sources
//! - [`access`]: Credentials and the access verifier
//! - [`ledger`]: Visits, filters and the visit ledger
//! - [`student`]: Student records, credential generation and the directory
//! - [`store`]: Repository traits and the in-memory store
//! - [`terminal`]: Terminal facade, session protocol, reports and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Terminal   │    │   Access    │    │   Ledger    │
//! │             │───►│             │    │             │
//! │ Session     │    │ Credential  │    │ Visits      │
//! │ Reports     │───►│ Verifier    │    │ Filters     │
//! │             │───────────────────────►│             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐    ┌──────────────────────────────────┐
//! │  Student    │───►│              Store               │
//! │             │    │                                  │
//! │ Directory   │    │ StudentRepository                │
//! │ Roster      │    │ VisitRepository                  │
//! └─────────────┘    └──────────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod access;
pub mod clock;
pub mod ledger;
pub mod store;
pub mod student;
pub mod terminal;

pub mod types;

// Core types and identifiers
pub use types::{
    AccessError,
    AccessResult,
    CliArgs,
    ConfigError,
    ConfigValidationError,
    RepeatEntryPolicy,
    RosterError,
    StoreError,
    // Identifiers
    StudentId,
    // Configuration
    TerminalConfig,
    VisitId,
    VisitStatus,
    VisitToken,
    // Enums
    Zone,
};

// Time
pub use clock::{Clock, ManualClock, SystemClock};

// Credentials and verification
pub use access::{AccessVerifier, Credential, CredentialPolicy};

// Visit lifecycle
pub use ledger::{DateRange, LedgerSummary, Visit, VisitFilter, VisitLedger, VisitRow};

// Students
pub use student::{ImportSummary, NewStudent, Roster, Student, StudentDirectory, StudentSummary};

// Storage
pub use store::{MemoryStore, Store, StudentRepository, VisitRepository};

// Terminal
pub use terminal::{AccessOutcome, AccessTerminal, LoggingConfig, Session, SessionStats};
