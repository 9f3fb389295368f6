//! Visit records and duration formatting
//!
//! A visit is created open by an entry event and closed exactly once by an
//! exit event. Closed is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{StudentId, VisitId, VisitStatus, VisitToken, Zone};

/// Placeholder shown in reports for a visit with no exit yet
pub const IN_PROGRESS_LABEL: &str = "Em uso";

/// One instance of a student occupying a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Primary key
    pub id: VisitId,
    /// Owning student
    pub student_id: StudentId,
    /// Zone entered
    pub zone: Zone,
    /// When the entry was registered
    pub entry_time: DateTime<Utc>,
    /// When the exit was registered; `None` while the visit is open
    pub exit_time: Option<DateTime<Utc>>,
    /// Formatted stay length, set together with `exit_time`
    pub duration: Option<String>,
    /// Token distinguishing this entry event
    pub visit_token: VisitToken,
    /// Creation order within the ledger, breaks `entry_time` ties
    pub sequence: u64,
}

impl Visit {
    /// Create a new open visit
    pub fn open(
        student_id: StudentId,
        zone: Zone,
        entry_time: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        Self {
            id: VisitId::new(),
            student_id,
            zone,
            entry_time,
            exit_time: None,
            duration: None,
            visit_token: VisitToken::new(),
            sequence,
        }
    }

    /// Check if the student is still inside
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Current lifecycle state
    pub fn status(&self) -> VisitStatus {
        if self.is_open() {
            VisitStatus::Open
        } else {
            VisitStatus::Closed
        }
    }

    /// Whole seconds between entry and exit, for closed visits
    pub fn duration_seconds(&self) -> Option<i64> {
        self.exit_time.map(|exit| (exit - self.entry_time).num_seconds().max(0))
    }

    /// Record the exit
    ///
    /// An exit earlier than the entry (clock skew) is clamped to the entry
    /// time. Returns `false` without touching the record if it is already closed.
    pub(crate) fn close(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_open() {
            return false;
        }

        let exit_time = at.max(self.entry_time);
        let seconds = (exit_time - self.entry_time).num_seconds();
        self.exit_time = Some(exit_time);
        self.duration = Some(format_duration(seconds));
        true
    }

    /// Ordering key for "most recent entry": entry time, then creation order
    pub fn recency_key(&self) -> (DateTime<Utc>, u64) {
        (self.entry_time, self.sequence)
    }

    /// Text for the exit column of a report
    pub fn exit_label(&self, time_format: &str) -> String {
        match self.exit_time {
            Some(exit) => exit.format(time_format).to_string(),
            None => IN_PROGRESS_LABEL.to_string(),
        }
    }
}

/// Format a stay length: `"{s}s"` under a minute, `"{m}m {s}s"` otherwise
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let minutes = seconds / 60;
    let remaining = seconds % 60;

    if minutes == 0 {
        format!("{}s", remaining)
    } else {
        format!("{}m {}s", minutes, remaining)
    }
}

/// Pick the open visit with the latest entry, creation order breaking ties
pub fn most_recent_open<'a, I>(visits: I) -> Option<&'a Visit>
where
    I: IntoIterator<Item = &'a Visit>,
{
    visits.into_iter().filter(|v| v.is_open()).max_by_key(|v| v.recency_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 10, 9, 15, 0).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(65), "1m 5s");
        assert_eq!(format_duration(300), "5m 0s");
        assert_eq!(format_duration(3725), "62m 5s");
        assert_eq!(format_duration(-3), "0s");
    }

    #[test]
    fn test_new_visit_is_open() {
        let visit = Visit::open(StudentId::new(), Zone::Female, entry(), 0);
        assert!(visit.is_open());
        assert_eq!(visit.status(), VisitStatus::Open);
        assert!(visit.duration.is_none());
        assert!(visit.duration_seconds().is_none());
        assert_eq!(visit.exit_label("%H:%M"), IN_PROGRESS_LABEL);
    }

    #[test]
    fn test_close_sets_exit_and_duration_once() {
        let mut visit = Visit::open(StudentId::new(), Zone::Male, entry(), 0);
        assert!(visit.close(entry() + Duration::seconds(65)));
        assert_eq!(visit.status(), VisitStatus::Closed);
        assert_eq!(visit.duration.as_deref(), Some("1m 5s"));
        assert_eq!(visit.duration_seconds(), Some(65));
        assert_eq!(visit.exit_label("%H:%M"), "09:16");

        let closed = visit.clone();
        assert!(!visit.close(entry() + Duration::minutes(10)));
        assert_eq!(visit, closed);
    }

    #[test]
    fn test_close_clamps_exit_before_entry() {
        let mut visit = Visit::open(StudentId::new(), Zone::Male, entry(), 0);
        visit.close(entry() - Duration::seconds(30));
        assert_eq!(visit.exit_time, Some(entry()));
        assert_eq!(visit.duration.as_deref(), Some("0s"));
    }

    #[test]
    fn test_most_recent_open_prefers_later_entry_then_later_sequence() {
        let student = StudentId::new();
        let early = Visit::open(student, Zone::Male, entry(), 0);
        let late = Visit::open(student, Zone::Male, entry() + Duration::seconds(1), 1);
        let tie = Visit::open(student, Zone::Male, entry() + Duration::seconds(1), 2);
        let mut closed = Visit::open(student, Zone::Male, entry() + Duration::seconds(5), 3);
        closed.close(entry() + Duration::seconds(6));

        let visits = vec![early.clone(), late, tie.clone(), closed];
        assert_eq!(most_recent_open(&visits).map(|v| v.id), Some(tie.id));

        assert_eq!(most_recent_open(std::iter::once(&early)).map(|v| v.id), Some(early.id));
        assert!(most_recent_open(std::iter::empty::<&Visit>()).is_none());
    }
}
