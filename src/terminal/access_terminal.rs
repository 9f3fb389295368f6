//! Terminal facade
//!
//! This module contains the AccessTerminal, which owns the repository and
//! sequences the verifier, the ledger and the directory over it. Every public
//! operation runs its whole read-check-write sequence under one lock.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, instrument, warn};

use crate::access::{AccessVerifier, Credential, CredentialPolicy};
use crate::clock::{Clock, SystemClock};
use crate::ledger::{LedgerSummary, Visit, VisitFilter, VisitLedger, VisitRow};
use crate::store::Store;
use crate::student::{
    demo_roster, demo_visits, ImportSummary, NewStudent, Roster, Student, StudentDirectory,
    StudentSummary,
};
use crate::types::{AccessError, AccessResult, StoreError, StudentId, TerminalConfig, Zone};

/// Result of a successful check-in or check-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessOutcome {
    /// Who passed the terminal
    pub student: StudentSummary,
    /// The visit opened or closed
    pub visit: Visit,
}

#[derive(Debug)]
struct TerminalState<S> {
    store: S,
    directory: StudentDirectory,
}

/// A restroom access terminal over a repository
#[derive(Debug)]
pub struct AccessTerminal<S: Store> {
    config: TerminalConfig,
    verifier: AccessVerifier,
    ledger: VisitLedger,
    clock: Arc<dyn Clock>,
    state: Mutex<TerminalState<S>>,
}

impl<S: Store> AccessTerminal<S> {
    /// Create a terminal reading the wall clock
    pub fn new(config: TerminalConfig, store: S) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Create a terminal reading time from `clock`
    pub fn with_clock(config: TerminalConfig, store: S, clock: Arc<dyn Clock>) -> Self {
        let verifier = AccessVerifier::new(CredentialPolicy::from_config(&config));
        let ledger = VisitLedger::new(config.repeat_entry_policy, clock.clone());
        let directory = StudentDirectory::new(&config, clock.clone());

        info!(
            policy = %config.repeat_entry_policy,
            scan_code_prefix = %config.scan_code_prefix,
            "Access terminal created"
        );

        Self {
            config,
            verifier,
            ledger,
            clock,
            state: Mutex::new(TerminalState { store, directory }),
        }
    }

    /// Configuration the terminal was built with
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Time source shared by the ledger and the directory
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    fn lock(&self) -> AccessResult<MutexGuard<'_, TerminalState<S>>> {
        self.state.lock().map_err(|_| {
            error!("Terminal state lock poisoned");
            AccessError::Store(StoreError::Poisoned)
        })
    }

    /// Load the three sample students and their visit history
    #[instrument(skip(self))]
    pub fn load_demo_data(&self) -> AccessResult<Vec<StudentSummary>> {
        let mut state = self.lock()?;
        let students = demo_roster(self.clock.now());
        let visits = demo_visits(&students);

        // Nothing is written unless every sample record fits
        for student in &students {
            if let Some(key) = Self::taken_key(&state.store, student)? {
                warn!(key = %key, "Demo data conflicts with an existing student");
                return Err(StoreError::DuplicateKey { entity: "student", key }.into());
            }
        }

        for student in &students {
            state.store.insert_student(student.clone())?;
        }
        for visit in visits {
            state.store.insert_visit(visit)?;
        }

        info!(students = students.len(), "Demo data loaded");
        Ok(students.iter().map(Student::summary).collect())
    }

    /// First unique key of `student` already held by a stored student
    fn taken_key(store: &S, student: &Student) -> AccessResult<Option<String>> {
        if store.find_by_enrollment(&student.enrollment_number)?.is_some() {
            return Ok(Some(student.enrollment_number.clone()));
        }
        if store.find_by_passcode(&student.passcode)?.is_some() {
            return Ok(Some("passcode".to_string()));
        }
        if store.find_by_scan_code(&student.scan_code)?.is_some() {
            return Ok(Some(student.scan_code.clone()));
        }
        Ok(None)
    }

    /// Check a raw credential without recording anything
    #[instrument(skip(self, raw))]
    pub fn verify(&self, raw: &str, zone: Zone) -> AccessResult<StudentSummary> {
        let credential = self.verifier.parse(raw)?;
        self.verify_credential(&credential, zone)
    }

    /// Check an already classified credential without recording anything
    pub fn verify_credential(&self, credential: &Credential, zone: Zone) -> AccessResult<StudentSummary> {
        let state = self.lock()?;
        Ok(self.verifier.verify(&state.store, credential, zone)?.summary())
    }

    /// Verify a raw credential and register an entry
    #[instrument(skip(self, raw))]
    pub fn check_in(&self, raw: &str, zone: Zone) -> AccessResult<AccessOutcome> {
        let credential = self.verifier.parse(raw)?;
        self.check_in_credential(&credential, zone)
    }

    /// Verify a credential and register an entry
    pub fn check_in_credential(&self, credential: &Credential, zone: Zone) -> AccessResult<AccessOutcome> {
        let mut state = self.lock()?;
        let student = self.verifier.verify(&state.store, credential, zone)?;
        let visit = self.ledger.open_visit(&mut state.store, student.id, zone)?;
        Ok(AccessOutcome { student: student.summary(), visit })
    }

    /// Verify a raw credential and register an exit
    #[instrument(skip(self, raw))]
    pub fn check_out(&self, raw: &str, zone: Zone) -> AccessResult<AccessOutcome> {
        let credential = self.verifier.parse(raw)?;
        self.check_out_credential(&credential, zone)
    }

    /// Verify a credential and register an exit
    pub fn check_out_credential(&self, credential: &Credential, zone: Zone) -> AccessResult<AccessOutcome> {
        let mut state = self.lock()?;
        let student = self.verifier.verify(&state.store, credential, zone)?;
        let visit = self.ledger.close_visit(&mut state.store, student.id, zone)?;
        Ok(AccessOutcome { student: student.summary(), visit })
    }

    /// Register an entry for a known student, skipping credential checks
    pub fn open_visit(&self, student_id: StudentId, zone: Zone) -> AccessResult<Visit> {
        let mut state = self.lock()?;
        self.ledger.open_visit(&mut state.store, student_id, zone)
    }

    /// Register an exit for a known student, skipping credential checks
    pub fn close_visit(&self, student_id: StudentId, zone: Zone) -> AccessResult<Visit> {
        let mut state = self.lock()?;
        self.ledger.close_visit(&mut state.store, student_id, zone)
    }

    /// Register one student
    #[instrument(skip(self, request), fields(enrollment = %request.enrollment_number))]
    pub fn register_student(&self, request: NewStudent) -> AccessResult<Student> {
        let mut guard = self.lock()?;
        let TerminalState { store, directory } = &mut *guard;
        directory.create_student(store, request)
    }

    /// Register every row of a roster, all or nothing
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub fn import_roster(&self, rows: Vec<NewStudent>) -> AccessResult<ImportSummary> {
        let mut guard = self.lock()?;
        let TerminalState { store, directory } = &mut *guard;
        directory.import_roster(store, rows)
    }

    /// Load a JSON roster file and import it
    pub fn import_roster_file<P: AsRef<Path>>(&self, path: P) -> AccessResult<ImportSummary> {
        let roster = Roster::from_file(path)?;
        self.import_roster(roster.into_rows())
    }

    /// All students sorted by name
    pub fn students(&self) -> AccessResult<Vec<Student>> {
        let state = self.lock()?;
        state.directory.list_students(&state.store)
    }

    /// Open visits of a student in any zone
    pub fn open_visits(&self, student_id: StudentId) -> AccessResult<Vec<Visit>> {
        let state = self.lock()?;
        self.ledger.open_visits(&state.store, student_id)
    }

    /// Visits matching `filter`, newest entry first
    pub fn visits(&self, filter: &VisitFilter) -> AccessResult<Vec<VisitRow>> {
        let state = self.lock()?;
        self.ledger.list_visits(&state.store, filter)
    }

    /// Visit counts
    pub fn summary(&self) -> AccessResult<LedgerSummary> {
        let state = self.lock()?;
        self.ledger.summary(&state.store)
    }

    /// Run a read-only closure against the repository
    pub fn with_store<T>(&self, f: impl FnOnce(&S) -> T) -> AccessResult<T> {
        let state = self.lock()?;
        Ok(f(&state.store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemoryStore, StudentRepository, VisitRepository};
    use chrono::Duration;

    fn terminal() -> (AccessTerminal<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let config = TerminalConfig { seed: Some(9), ..Default::default() };
        let terminal = AccessTerminal::with_clock(config, MemoryStore::new(), clock.clone());
        terminal.load_demo_data().unwrap();
        (terminal, clock)
    }

    #[test]
    fn test_terminal_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AccessTerminal<MemoryStore>>();
    }

    #[test]
    fn test_check_in_and_out() {
        let (terminal, clock) = terminal();

        let entry = terminal.check_in("QR-0987654321", Zone::Female).unwrap();
        assert_eq!(entry.student.name, "Maria Oliveira");
        assert!(entry.visit.is_open());

        clock.advance_by(Duration::seconds(42));
        let exit = terminal.check_out("654321", Zone::Female).unwrap();
        assert_eq!(exit.visit.id, entry.visit.id);
        assert_eq!(exit.visit.duration.as_deref(), Some("42s"));
    }

    #[test]
    fn test_demo_visit_blocks_other_zone() {
        let (terminal, _) = terminal();

        // Pedro's demo visit in the male restroom is still open
        let err = terminal.check_in("112233", Zone::Female).unwrap_err();
        assert_eq!(err.kind(), "zone_conflict");
        assert!(terminal.verify("112233", Zone::Male).is_ok());
    }

    #[test]
    fn test_failed_operations_leave_state_unchanged() {
        let (terminal, _) = terminal();
        let before = terminal.with_store(|s| s.visit_count().unwrap()).unwrap();

        assert_eq!(terminal.check_in("999999", Zone::Male).unwrap_err().kind(), "not_found");
        assert_eq!(terminal.check_out("123456", Zone::Male).unwrap_err().kind(), "no_open_visit");
        assert_eq!(terminal.check_in("12", Zone::Male).unwrap_err().kind(), "invalid_credential");

        let after = terminal.with_store(|s| s.visit_count().unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_demo_data_is_all_or_nothing() {
        let mut store = MemoryStore::new();
        store
            .insert_student(Student {
                id: StudentId::new(),
                name: "Clara".to_string(),
                class_label: "6A".to_string(),
                enrollment_number: "555".to_string(),
                passcode: "654321".to_string(),
                scan_code: "QR-555".to_string(),
                roll_number: None,
                created_at: chrono::Utc::now(),
            })
            .unwrap();
        let terminal = AccessTerminal::new(TerminalConfig::default(), store);

        // Maria's sample passcode is already taken
        let err = terminal.load_demo_data().unwrap_err();
        assert!(matches!(err, AccessError::Store(StoreError::DuplicateKey { entity: "student", .. })));

        assert_eq!(terminal.students().unwrap().len(), 1);
        assert_eq!(terminal.summary().unwrap().total_visits, 0);
    }

    #[test]
    fn test_demo_data_loads_once() {
        let (terminal, _) = terminal();
        assert!(terminal.load_demo_data().is_err());
        assert_eq!(terminal.students().unwrap().len(), 3);
        assert_eq!(terminal.summary().unwrap().total_visits, 3);
    }

    #[test]
    fn test_register_then_check_in_with_generated_passcode() {
        let (terminal, _) = terminal();
        let ana = terminal.register_student(NewStudent::new("Ana", "8A", "900")).unwrap();

        let outcome = terminal.check_in(&ana.passcode, Zone::Female).unwrap();
        assert_eq!(outcome.student.id, ana.id);
        assert_eq!(terminal.open_visits(ana.id).unwrap().len(), 1);
    }
}
