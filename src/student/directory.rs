//! Student registration and roster import
//!
//! This module contains the StudentDirectory, which validates registration
//! requests, generates unique credentials and writes students to a repository.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::store::StudentRepository;
use crate::student::{CredentialGenerator, NewStudent, Student};
use crate::types::{AccessError, AccessResult, StudentId, TerminalConfig};

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Students written
    pub imported: usize,
    /// Rows in the roster
    pub total: usize,
}

/// Credentials handed out in the current batch but not yet stored
#[derive(Debug, Default)]
struct Reserved {
    passcodes: HashSet<String>,
    scan_codes: HashSet<String>,
}

/// Registers students and hands out their credentials
#[derive(Debug)]
pub struct StudentDirectory {
    generator: CredentialGenerator,
    clock: Arc<dyn Clock>,
    scan_code_prefix: String,
    min_digits: usize,
    max_digits: usize,
    attempts: usize,
}

impl StudentDirectory {
    /// Create a directory using the credential settings of `config`
    pub fn new(config: &TerminalConfig, clock: Arc<dyn Clock>) -> Self {
        let generator = match config.seed {
            Some(seed) => CredentialGenerator::with_seed(seed),
            None => CredentialGenerator::new(),
        };

        Self {
            generator,
            clock,
            scan_code_prefix: config.scan_code_prefix.clone(),
            min_digits: config.passcode_min_digits,
            max_digits: config.passcode_max_digits,
            attempts: config.credential_attempts.max(1),
        }
    }

    /// Register one student
    ///
    /// Fields are trimmed first. Fails with [`AccessError::MissingField`] or
    /// [`AccessError::DuplicateEnrollment`] without writing anything.
    pub fn create_student<R>(&mut self, repo: &mut R, request: NewStudent) -> AccessResult<Student>
    where
        R: StudentRepository + ?Sized,
    {
        let request = self.validate(&*repo, &request)?;
        let student = self.build_student(&*repo, request, &mut Reserved::default())?;
        repo.insert_student(student.clone())?;

        info!(
            student_id = %student.id,
            enrollment = %student.enrollment_number,
            class = %student.class_label,
            "Student registered"
        );
        Ok(student)
    }

    /// Register a whole roster, all or nothing
    ///
    /// Every row is validated, including duplicate enrollments inside the
    /// batch, and every credential generated before the first write. The
    /// first failure aborts the import with the repository untouched.
    pub fn import_roster<R>(&mut self, repo: &mut R, rows: Vec<NewStudent>) -> AccessResult<ImportSummary>
    where
        R: StudentRepository + ?Sized,
    {
        let total = rows.len();
        let mut seen = HashSet::with_capacity(total);
        let mut validated = Vec::with_capacity(total);

        for (row, request) in rows.iter().enumerate() {
            let request = self.validate(&*repo, request).map_err(|err| {
                warn!(row = row + 1, error = %err, "Roster import rejected");
                err
            })?;
            if !seen.insert(request.enrollment_number.clone()) {
                warn!(row = row + 1, enrollment = %request.enrollment_number, "Roster repeats an enrollment");
                return Err(AccessError::DuplicateEnrollment(request.enrollment_number));
            }
            validated.push(request);
        }

        let mut reserved = Reserved::default();
        let mut students = Vec::with_capacity(total);
        for request in validated {
            students.push(self.build_student(&*repo, request, &mut reserved)?);
        }

        for student in students {
            repo.insert_student(student)?;
        }

        info!(imported = total, "Roster imported");
        Ok(ImportSummary { imported: total, total })
    }

    /// All students sorted by name
    pub fn list_students<R>(&self, repo: &R) -> AccessResult<Vec<Student>>
    where
        R: StudentRepository + ?Sized,
    {
        let mut students = repo.list_students()?;
        students.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.enrollment_number.cmp(&b.enrollment_number))
        });
        Ok(students)
    }

    /// Trimmed copy of `request`, checked for empty fields and a taken enrollment
    fn validate<R>(&self, repo: &R, request: &NewStudent) -> AccessResult<NewStudent>
    where
        R: StudentRepository + ?Sized,
    {
        let request = request.trimmed();

        if let Some(field) = request.missing_field() {
            return Err(AccessError::MissingField(field));
        }

        if repo.find_by_enrollment(&request.enrollment_number)?.is_some() {
            return Err(AccessError::DuplicateEnrollment(request.enrollment_number));
        }

        Ok(request)
    }

    fn build_student<R>(
        &mut self,
        repo: &R,
        request: NewStudent,
        reserved: &mut Reserved,
    ) -> AccessResult<Student>
    where
        R: StudentRepository + ?Sized,
    {
        let now = self.clock.now();

        let passcode = self.unique_credential(
            "passcode",
            |generator, min, max, _| generator.generate_passcode(min, max),
            |code| Ok(repo.find_by_passcode(code)?.is_none() && !reserved.passcodes.contains(code)),
        )?;
        let scan_code = self.unique_credential(
            "scan code",
            |generator, _, _, prefix| generator.generate_scan_code(prefix, now),
            |code| Ok(repo.find_by_scan_code(code)?.is_none() && !reserved.scan_codes.contains(code)),
        )?;

        reserved.passcodes.insert(passcode.clone());
        reserved.scan_codes.insert(scan_code.clone());

        Ok(Student {
            id: StudentId::new(),
            name: request.name,
            class_label: request.class_label,
            enrollment_number: request.enrollment_number,
            passcode,
            scan_code,
            roll_number: request.roll_number,
            created_at: now,
        })
    }

    /// Draw credentials until `is_free` accepts one or the attempt budget runs out
    fn unique_credential<G, F>(
        &mut self,
        credential_kind: &'static str,
        mut generate: G,
        is_free: F,
    ) -> AccessResult<String>
    where
        G: FnMut(&mut CredentialGenerator, usize, usize, &str) -> String,
        F: Fn(&str) -> AccessResult<bool>,
    {
        for attempt in 1..=self.attempts {
            let candidate = generate(
                &mut self.generator,
                self.min_digits,
                self.max_digits,
                &self.scan_code_prefix,
            );
            if is_free(&candidate)? {
                return Ok(candidate);
            }
            debug!(credential_kind, attempt, "Generated credential already taken, retrying");
        }

        warn!(credential_kind, attempts = self.attempts, "Credential space exhausted");
        Err(AccessError::CredentialSpaceExhausted { credential_kind, attempts: self.attempts })
    }
}
