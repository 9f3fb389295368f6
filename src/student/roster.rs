//! Roster files and sample data
//!
//! This module loads class rosters for bulk import and provides the sample
//! students and visits used by demo mode.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::ledger::Visit;
use crate::student::{NewStudent, Student};
use crate::types::{RosterError, StudentId, Zone};

/// A list of students to bulk-import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    /// Rows in file order
    pub rows: Vec<NewStudent>,
}

impl Roster {
    /// Wrap already parsed rows
    pub fn new(rows: Vec<NewStudent>) -> Self {
        Self { rows }
    }

    /// Load a roster from a JSON file holding an array of rows
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RosterError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let roster = Self::from_json_str(&content)?;
                debug!(path = %path.display(), rows = roster.len(), "Roster file loaded");
                Ok(roster)
            }
            Some(ext) => Err(RosterError::UnsupportedFormat(ext.to_string())),
            None => Err(RosterError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Parse a roster from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the roster has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Take the rows
    pub fn into_rows(self) -> Vec<NewStudent> {
        self.rows
    }
}

/// The five-student class list used to demonstrate bulk import
pub fn sample_import_roster() -> Roster {
    let rows = [
        ("Ana Beatriz", "2023010", "01"),
        ("Bruno Costa", "2023011", "02"),
        ("Carla Dias", "2023012", "03"),
        ("Daniel Esteves", "2023013", "04"),
        ("Eduarda Freitas", "2023014", "05"),
    ]
    .into_iter()
    .map(|(name, enrollment, roll)| NewStudent::new(name, "8º Ano B", enrollment).with_roll_number(roll))
    .collect();

    Roster::new(rows)
}

/// The three sample students with fixed, printable credentials
pub fn demo_roster(created_at: DateTime<Utc>) -> Vec<Student> {
    [
        ("João Silva", "9º Ano A", "2023001", "123456", "QR-1234567890"),
        ("Maria Oliveira", "8º Ano B", "2023002", "654321", "QR-0987654321"),
        ("Pedro Santos", "7º Ano C", "2023003", "112233", "QR-1122334455"),
    ]
    .into_iter()
    .map(|(name, class_label, enrollment, passcode, scan_code)| Student {
        id: StudentId::new(),
        name: name.to_string(),
        class_label: class_label.to_string(),
        enrollment_number: enrollment.to_string(),
        passcode: passcode.to_string(),
        scan_code: scan_code.to_string(),
        roll_number: None,
        created_at,
    })
    .collect()
}

/// Visit history for the demo students: two finished visits and one in progress
///
/// `students` is expected in [`demo_roster`] order; missing entries are skipped.
pub fn demo_visits(students: &[Student]) -> Vec<Visit> {
    let at = |h, m| Utc.with_ymd_and_hms(2023, 5, 10, h, m, 0).single();

    let history = [
        (0, Zone::Male, (8, 30), Some((8, 35))),
        (1, Zone::Female, (9, 15), Some((9, 20))),
        (2, Zone::Male, (10, 45), None),
    ];

    let mut visits = Vec::new();
    for (idx, zone, (eh, em), exit) in history {
        let (Some(student), Some(entry)) = (students.get(idx), at(eh, em)) else {
            continue;
        };

        let mut visit = Visit::open(student.id, zone, entry, visits.len() as u64);
        if let Some(exit) = exit.and_then(|(xh, xm)| at(xh, xm)) {
            visit.close(exit);
        }
        visits.push(visit);
    }
    visits
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_roster_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"name":"Ana","class_label":"8A","enrollment_number":"900","numero_chamada":"07"}},
               {{"name":"Beto","class_label":"8A","enrollment_number":"901"}}]"#
        )
        .unwrap();

        let roster = Roster::from_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rows[0].roll_number.as_deref(), Some("07"));
        assert_eq!(roster.rows[1].roll_number, None);
    }

    #[test]
    fn test_roster_rejects_other_formats() {
        let file = NamedTempFile::new().unwrap();
        let sheet = file.path().with_extension("xlsx");
        fs::write(&sheet, "x").unwrap();

        assert!(matches!(Roster::from_file(&sheet), Err(RosterError::UnsupportedFormat(ext)) if ext == "xlsx"));
        assert!(matches!(
            Roster::from_file("/nonexistent/roster.json"),
            Err(RosterError::FileNotFound(_))
        ));
        fs::remove_file(sheet).unwrap();
    }

    #[test]
    fn test_sample_data() {
        let roster = sample_import_roster();
        assert_eq!(roster.len(), 5);
        assert!(roster.rows.iter().all(|r| r.class_label == "8º Ano B"));

        let students = demo_roster(Utc::now());
        assert_eq!(students[0].scan_code, "QR-1234567890");
        assert_eq!(students[1].passcode, "654321");
        assert!(students
            .iter()
            .all(|s| s.passcode.len() == crate::types::credentials::DEMO_PASSCODE_DIGITS));

        let visits = demo_visits(&students);
        assert_eq!(visits.len(), 3);
        assert_eq!(visits[0].duration.as_deref(), Some("5m 0s"));
        assert!(visits[2].is_open());
        assert_eq!(visits[2].student_id, students[2].id);
    }
}
