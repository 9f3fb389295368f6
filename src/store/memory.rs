//! In-memory repository
//!
//! Records live in vectors with hash indexes on every unique key.

use std::collections::HashMap;

use crate::ledger::Visit;
use crate::store::{StudentRepository, VisitRepository};
use crate::student::Student;
use crate::types::{StoreError, StoreResult, StudentId, VisitId, Zone};

/// Students and visits held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    students: Vec<Student>,
    visits: Vec<Visit>,
    student_index: HashMap<StudentId, usize>,
    enrollment_index: HashMap<String, usize>,
    passcode_index: HashMap<String, usize>,
    scan_code_index: HashMap<String, usize>,
    visit_index: HashMap<VisitId, usize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn student_at(&self, idx: Option<&usize>) -> Option<Student> {
        idx.and_then(|&i| self.students.get(i)).cloned()
    }
}

impl StudentRepository for MemoryStore {
    fn insert_student(&mut self, student: Student) -> StoreResult<()> {
        let duplicate = |key: &str| StoreError::DuplicateKey { entity: "student", key: key.to_string() };

        if self.student_index.contains_key(&student.id) {
            return Err(duplicate(&student.id.to_string()));
        }
        if self.enrollment_index.contains_key(&student.enrollment_number) {
            return Err(duplicate(&student.enrollment_number));
        }
        if self.passcode_index.contains_key(&student.passcode) {
            return Err(duplicate("passcode"));
        }
        if self.scan_code_index.contains_key(&student.scan_code) {
            return Err(duplicate(&student.scan_code));
        }

        let idx = self.students.len();
        self.student_index.insert(student.id, idx);
        self.enrollment_index.insert(student.enrollment_number.clone(), idx);
        self.passcode_index.insert(student.passcode.clone(), idx);
        self.scan_code_index.insert(student.scan_code.clone(), idx);
        self.students.push(student);
        Ok(())
    }

    fn find_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.student_at(self.student_index.get(&id)))
    }

    fn find_by_scan_code(&self, scan_code: &str) -> StoreResult<Option<Student>> {
        Ok(self.student_at(self.scan_code_index.get(scan_code)))
    }

    fn find_by_passcode(&self, passcode: &str) -> StoreResult<Option<Student>> {
        Ok(self.student_at(self.passcode_index.get(passcode)))
    }

    fn find_by_enrollment(&self, enrollment_number: &str) -> StoreResult<Option<Student>> {
        Ok(self.student_at(self.enrollment_index.get(enrollment_number)))
    }

    fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn student_count(&self) -> StoreResult<usize> {
        Ok(self.students.len())
    }
}

impl VisitRepository for MemoryStore {
    fn insert_visit(&mut self, visit: Visit) -> StoreResult<()> {
        if self.visit_index.contains_key(&visit.id) {
            return Err(StoreError::DuplicateKey { entity: "visit", key: visit.id.to_string() });
        }

        self.visit_index.insert(visit.id, self.visits.len());
        self.visits.push(visit);
        Ok(())
    }

    fn update_visit(&mut self, visit: &Visit) -> StoreResult<()> {
        let slot = self
            .visit_index
            .get(&visit.id)
            .and_then(|&idx| self.visits.get_mut(idx))
            .ok_or_else(|| StoreError::RecordNotFound { entity: "visit", id: visit.id.to_string() })?;

        *slot = visit.clone();
        Ok(())
    }

    fn open_visits_for(&self, student_id: StudentId, zone: Option<Zone>) -> StoreResult<Vec<Visit>> {
        Ok(self
            .visits
            .iter()
            .filter(|v| v.student_id == student_id && v.is_open())
            .filter(|v| zone.map_or(true, |z| v.zone == z))
            .cloned()
            .collect())
    }

    fn list_visits(&self) -> StoreResult<Vec<Visit>> {
        Ok(self.visits.clone())
    }

    fn visit_count(&self) -> StoreResult<usize> {
        Ok(self.visits.len())
    }
}
