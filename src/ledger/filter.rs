//! Query parameters for visit listings
//!
//! This module contains the explicit filter struct accepted by the ledger's
//! listing query and the calendar-day window used for date filtering.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Visit;
use crate::student::Student;
use crate::types::{StudentId, Zone};

/// Inclusive window of entry times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant included
    pub start: DateTime<Utc>,
    /// Last instant included
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Create a range from explicit bounds
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The whole calendar day `date` in time zone `tz`, 00:00:00.000 through 23:59:59.999
    pub fn for_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        let last_milli = midnight + Duration::days(1) - Duration::milliseconds(1);

        Self {
            start: resolve_local(tz, midnight, true),
            end: resolve_local(tz, last_milli, false),
        }
    }

    /// The whole calendar day `date` in the machine's local time zone
    pub fn for_local_day(date: NaiveDate) -> Self {
        Self::for_day(date, &Local)
    }

    /// Check if an instant falls inside the range
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Map a wall-clock time to UTC, stepping over DST gaps and picking the
/// earlier (`prefer_earliest`) or later reading of an ambiguous hour
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, prefer_earliest: bool) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(early, late) => {
            if prefer_earliest {
                early.with_timezone(&Utc)
            } else {
                late.with_timezone(&Utc)
            }
        }
        LocalResult::None => {
            // Wall time skipped by a DST jump: midnight becomes the first valid instant after it
            let shifted = if prefer_earliest {
                naive + Duration::hours(1)
            } else {
                naive - Duration::hours(1)
            };
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
        }
    }
}

/// Filters for listing visits; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitFilter {
    /// Only visits in this zone
    pub zone: Option<Zone>,
    /// Only visits of this student
    pub student_id: Option<StudentId>,
    /// Only students whose class label contains this text (case-sensitive)
    pub class_contains: Option<String>,
    /// Only visits whose entry falls inside this window
    pub date_range: Option<DateRange>,
    /// Only visits without an exit
    #[serde(default)]
    pub open_only: bool,
}

impl VisitFilter {
    /// Match every visit
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a zone
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Restrict to a student
    pub fn with_student(mut self, student_id: StudentId) -> Self {
        self.student_id = Some(student_id);
        self
    }

    /// Restrict to classes containing `text`; empty text is ignored
    pub fn with_class_containing(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.class_contains = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Restrict to an entry window
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Restrict to visits still in progress
    pub fn open_only(mut self) -> Self {
        self.open_only = true;
        self
    }

    /// Check a visit (and its owner, when known) against every set field
    ///
    /// A class filter never matches a visit whose student is unknown.
    pub fn matches(&self, visit: &Visit, student: Option<&Student>) -> bool {
        if self.zone.is_some_and(|zone| visit.zone != zone) {
            return false;
        }
        if self.student_id.is_some_and(|id| visit.student_id != id) {
            return false;
        }
        if self.open_only && !visit.is_open() {
            return false;
        }
        if let Some(range) = &self.date_range {
            if !range.contains(visit.entry_time) {
                return false;
            }
        }
        if let Some(text) = &self.class_contains {
            match student {
                Some(s) if s.class_label.contains(text.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}
