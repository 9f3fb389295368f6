//! Terminal facade, session protocol and reporting
//!
//! This module contains the pieces the binary is assembled from: the
//! [`AccessTerminal`] that owns the repository, the JSON-lines [`Session`]
//! that drives it, text reports and logging setup.
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::store::MemoryStore;
//! use restroom_access::terminal::*;
//! use restroom_access::types::*;
//!
//! let terminal = AccessTerminal::new(TerminalConfig::default(), MemoryStore::new());
//! terminal.load_demo_data().unwrap();
//!
//! let outcome = terminal.check_in("QR-1234567890", Zone::Male).unwrap();
//! assert_eq!(outcome.student.name, "João Silva");
//!
//! let input = r#"{"op":"check_out","credential":"123456","zone":"male"}"#;
//! let mut output = Vec::new();
//! let stats = run_session(&terminal, input.as_bytes(), &mut output).unwrap();
//! assert_eq!(stats.failures, 0);
//! ```

pub mod access_terminal;
pub mod logging;
pub mod report;
pub mod session;

pub use access_terminal::{AccessOutcome, AccessTerminal};
pub use logging::{LoggingConfig, LoggingError, LoggingGuard};
pub use report::{render_student_table, render_visit_table};
pub use session::{run_session, Command, Session, SessionStats};
