//! Visit lifecycle tracking
//!
//! This module contains the visit record, the listing filters and the
//! [`VisitLedger`] that registers entries and exits.
//!
//! # Overview
//!
//! - **Visit**: one stay of a student in a zone, open until an exit is registered
//! - **VisitFilter**: explicit query parameters for listings
//! - **VisitLedger**: opens visits on entry and closes the most recent one on exit
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::clock::ManualClock;
//! use restroom_access::ledger::*;
//! use restroom_access::store::MemoryStore;
//! use restroom_access::types::*;
//! use chrono::Duration;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::starting_now());
//! let ledger = VisitLedger::new(RepeatEntryPolicy::Stack, clock.clone());
//! let mut store = MemoryStore::new();
//! let student = StudentId::new();
//!
//! ledger.open_visit(&mut store, student, Zone::Female).unwrap();
//! clock.advance_by(Duration::seconds(95));
//! let visit = ledger.close_visit(&mut store, student, Zone::Female).unwrap();
//! assert_eq!(visit.duration.as_deref(), Some("1m 35s"));
//! ```

pub mod filter;
pub mod visit;
pub mod visit_ledger;

pub use filter::{DateRange, VisitFilter};
pub use visit::{format_duration, most_recent_open, Visit, IN_PROGRESS_LABEL};
pub use visit_ledger::{LedgerSummary, VisitLedger, VisitRow};
