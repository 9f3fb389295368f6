//! Core student record
//!
//! This module contains the Student struct and the registration payload it is
//! built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::StudentId;

/// A registered student
///
/// Records are immutable once created; the directory never edits or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier for the student
    pub id: StudentId,
    /// Full name
    pub name: String,
    /// Class the student belongs to (e.g. "8º Ano B")
    pub class_label: String,
    /// School enrollment number, unique across students
    pub enrollment_number: String,
    /// Numeric passcode typed at the terminal
    pub passcode: String,
    /// Token encoded in the student's printed code
    pub scan_code: String,
    /// Call-list number from the class roster, when imported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    /// When the student was registered
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Identity fields safe to show on the kiosk screen
    pub fn summary(&self) -> StudentSummary {
        StudentSummary {
            id: self.id,
            name: self.name.clone(),
            class_label: self.class_label.clone(),
        }
    }
}

/// Public view of a student, without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    /// Student identifier
    pub id: StudentId,
    /// Full name
    pub name: String,
    /// Class label
    pub class_label: String,
}

/// Registration request, also the row format of roster files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    /// Full name
    pub name: String,
    /// Class label
    pub class_label: String,
    /// Enrollment number
    pub enrollment_number: String,
    /// Optional call-list number
    #[serde(default, alias = "numero_chamada")]
    pub roll_number: Option<String>,
}

impl NewStudent {
    /// Build a registration request
    pub fn new(
        name: impl Into<String>,
        class_label: impl Into<String>,
        enrollment_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class_label: class_label.into(),
            enrollment_number: enrollment_number.into(),
            roll_number: None,
        }
    }

    /// Attach a call-list number
    pub fn with_roll_number(mut self, roll_number: impl Into<String>) -> Self {
        self.roll_number = Some(roll_number.into());
        self
    }

    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            class_label: self.class_label.trim().to_string(),
            enrollment_number: self.enrollment_number.trim().to_string(),
            roll_number: self
                .roll_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Name of the first required field that is empty, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.class_label.trim().is_empty() {
            Some("class_label")
        } else if self.enrollment_number.trim().is_empty() {
            Some("enrollment_number")
        } else {
            None
        }
    }
}
