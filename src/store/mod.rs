//! Repository interfaces for students and visits
//!
//! The directory, the verifier and the ledger only ever talk to these traits.
//! [`MemoryStore`] is the in-process implementation used by the terminal.
//!
//! # Usage Example
//!
//! ```rust
//! use restroom_access::store::*;
//! use restroom_access::ledger::Visit;
//! use restroom_access::types::{StudentId, Zone};
//! use chrono::Utc;
//!
//! let mut store = MemoryStore::new();
//! let visit = Visit::open(StudentId::new(), Zone::Male, Utc::now(), store.visit_count().unwrap() as u64);
//! store.insert_visit(visit.clone()).unwrap();
//!
//! let open = store.open_visits_for(visit.student_id, None).unwrap();
//! assert_eq!(open.len(), 1);
//! ```

pub mod memory;

pub use memory::MemoryStore;

use crate::ledger::Visit;
use crate::student::Student;
use crate::types::{StoreResult, StudentId, Zone};

/// Lookup and insertion of student records
pub trait StudentRepository {
    /// Persist a new student; fails if enrollment, passcode or scan code is taken
    fn insert_student(&mut self, student: Student) -> StoreResult<()>;

    /// Find a student by identifier
    fn find_student(&self, id: StudentId) -> StoreResult<Option<Student>>;

    /// Find the student holding a scan code
    fn find_by_scan_code(&self, scan_code: &str) -> StoreResult<Option<Student>>;

    /// Find the student holding a passcode
    fn find_by_passcode(&self, passcode: &str) -> StoreResult<Option<Student>>;

    /// Find the student with an enrollment number
    fn find_by_enrollment(&self, enrollment_number: &str) -> StoreResult<Option<Student>>;

    /// All students, in registration order
    fn list_students(&self) -> StoreResult<Vec<Student>>;

    /// Number of registered students
    fn student_count(&self) -> StoreResult<usize>;
}

/// Insertion, update and lookup of visit records
pub trait VisitRepository {
    /// Persist a new visit
    fn insert_visit(&mut self, visit: Visit) -> StoreResult<()>;

    /// Overwrite an existing visit with the same id
    fn update_visit(&mut self, visit: &Visit) -> StoreResult<()>;

    /// Open visits of a student, optionally restricted to one zone
    fn open_visits_for(&self, student_id: StudentId, zone: Option<Zone>) -> StoreResult<Vec<Visit>>;

    /// All visits, in creation order
    fn list_visits(&self) -> StoreResult<Vec<Visit>>;

    /// Number of visits ever recorded
    fn visit_count(&self) -> StoreResult<usize>;
}

/// A store holding both students and visits
pub trait Store: StudentRepository + VisitRepository {}

impl<T: StudentRepository + VisitRepository> Store for T {}
