//! Entry and exit registration
//!
//! This module contains the VisitLedger, which creates visits on entry,
//! closes the most recent open visit on exit and answers listing queries.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::ledger::{most_recent_open, Visit, VisitFilter};
use crate::store::{StudentRepository, VisitRepository};
use crate::student::Student;
use crate::types::{AccessError, AccessResult, RepeatEntryPolicy, StudentId, Zone};

/// A visit together with the owner's display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRow {
    /// The visit record
    #[serde(flatten)]
    pub visit: Visit,
    /// Owner's name, absent if the student is no longer known
    pub student_name: Option<String>,
    /// Owner's class label, absent if the student is no longer known
    pub student_class: Option<String>,
}

/// Visit counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Visits ever recorded
    pub total_visits: usize,
    /// Visits still in progress
    pub open_visits: usize,
    /// Visits with an exit recorded
    pub closed_visits: usize,
    /// In-progress visits per zone
    pub open_by_zone: BTreeMap<Zone, usize>,
}

/// Registers entries and exits against a visit repository
#[derive(Debug, Clone)]
pub struct VisitLedger {
    policy: RepeatEntryPolicy,
    clock: Arc<dyn Clock>,
}

impl VisitLedger {
    /// Create a ledger reading time from `clock`
    pub fn new(policy: RepeatEntryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    /// Policy applied to repeated entries
    pub fn policy(&self) -> RepeatEntryPolicy {
        self.policy
    }

    /// Register an entry
    ///
    /// Under [`RepeatEntryPolicy::Stack`] this always appends a new open visit
    /// with a fresh token, even if the student is already open in the zone.
    /// Under [`RepeatEntryPolicy::ReuseOpen`] the most recent open visit for
    /// the student and zone is returned unchanged when one exists.
    pub fn open_visit<R>(&self, repo: &mut R, student_id: StudentId, zone: Zone) -> AccessResult<Visit>
    where
        R: VisitRepository + ?Sized,
    {
        if self.policy == RepeatEntryPolicy::ReuseOpen {
            let open = repo.open_visits_for(student_id, Some(zone))?;
            if let Some(existing) = most_recent_open(&open) {
                debug!(
                    student_id = %student_id,
                    visit_id = %existing.id,
                    "Reusing open visit for repeated entry"
                );
                return Ok(existing.clone());
            }
        }

        let sequence = repo.visit_count()? as u64;
        let visit = Visit::open(student_id, zone, self.clock.now(), sequence);
        repo.insert_visit(visit.clone())?;

        info!(
            student_id = %student_id,
            zone = %zone,
            visit_id = %visit.id,
            visit_token = %visit.visit_token,
            "Entry registered"
        );
        Ok(visit)
    }

    /// Register an exit
    ///
    /// Closes the open visit with the latest entry for the student and zone,
    /// leaving any earlier open visits untouched. Fails with
    /// [`AccessError::NoOpenVisit`] and changes nothing when none is open.
    pub fn close_visit<R>(&self, repo: &mut R, student_id: StudentId, zone: Zone) -> AccessResult<Visit>
    where
        R: VisitRepository + ?Sized,
    {
        let open = repo.open_visits_for(student_id, Some(zone))?;
        let Some(mut visit) = most_recent_open(&open).cloned() else {
            warn!(student_id = %student_id, zone = %zone, "Exit rejected: no open visit");
            return Err(AccessError::NoOpenVisit { student_id, zone });
        };

        if open.len() > 1 {
            debug!(
                student_id = %student_id,
                zone = %zone,
                stacked = open.len(),
                "Closing most recent of several open visits"
            );
        }

        visit.close(self.clock.now());
        repo.update_visit(&visit)?;

        info!(
            student_id = %student_id,
            zone = %zone,
            visit_id = %visit.id,
            duration = visit.duration.as_deref().unwrap_or_default(),
            "Exit registered"
        );
        Ok(visit)
    }

    /// Open visits of a student in any zone
    pub fn open_visits<R>(&self, repo: &R, student_id: StudentId) -> AccessResult<Vec<Visit>>
    where
        R: VisitRepository + ?Sized,
    {
        Ok(repo.open_visits_for(student_id, None)?)
    }

    /// Visits matching `filter`, newest entry first, with owner details attached
    pub fn list_visits<R>(&self, repo: &R, filter: &VisitFilter) -> AccessResult<Vec<VisitRow>>
    where
        R: VisitRepository + StudentRepository + ?Sized,
    {
        let students: HashMap<StudentId, Student> =
            repo.list_students()?.into_iter().map(|s| (s.id, s)).collect();

        let mut rows: Vec<VisitRow> = repo
            .list_visits()?
            .into_iter()
            .filter(|visit| filter.matches(visit, students.get(&visit.student_id)))
            .map(|visit| {
                let owner = students.get(&visit.student_id);
                VisitRow {
                    student_name: owner.map(|s| s.name.clone()),
                    student_class: owner.map(|s| s.class_label.clone()),
                    visit,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.visit.recency_key().cmp(&a.visit.recency_key()));

        debug!(matched = rows.len(), "Visit listing computed");
        Ok(rows)
    }

    /// Counts of total, open and closed visits
    pub fn summary<R>(&self, repo: &R) -> AccessResult<LedgerSummary>
    where
        R: VisitRepository + ?Sized,
    {
        let mut summary = LedgerSummary::default();
        for zone in Zone::ALL {
            summary.open_by_zone.insert(zone, 0);
        }

        for visit in repo.list_visits()? {
            summary.total_visits += 1;
            if visit.is_open() {
                summary.open_visits += 1;
                *summary.open_by_zone.entry(visit.zone).or_insert(0) += 1;
            } else {
                summary.closed_visits += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn ledger(policy: RepeatEntryPolicy) -> (VisitLedger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2023, 5, 10, 9, 0, 0).unwrap()));
        (VisitLedger::new(policy, clock.clone()), clock)
    }

    #[test]
    fn test_open_adds_exactly_one_open_visit() {
        let (ledger, _) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let student = StudentId::new();

        let visit = ledger.open_visit(&mut store, student, Zone::Female).unwrap();
        assert!(visit.is_open());
        assert_eq!(store.open_visits_for(student, Some(Zone::Female)).unwrap(), vec![visit]);
    }

    #[test]
    fn test_close_without_open_visit_changes_nothing() {
        let (ledger, _) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let student = StudentId::new();
        ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        let before = store.list_visits().unwrap();

        let err = ledger.close_visit(&mut store, student, Zone::Female).unwrap_err();
        assert!(matches!(err, AccessError::NoOpenVisit { zone: Zone::Female, .. }));
        assert_eq!(store.list_visits().unwrap(), before);
    }

    #[test]
    fn test_close_twice_fails_second_time() {
        let (ledger, clock) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let student = StudentId::new();

        ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        clock.advance_by(Duration::seconds(65));
        let closed = ledger.close_visit(&mut store, student, Zone::Male).unwrap();
        assert_eq!(closed.duration.as_deref(), Some("1m 5s"));

        assert!(matches!(
            ledger.close_visit(&mut store, student, Zone::Male),
            Err(AccessError::NoOpenVisit { .. })
        ));
    }

    #[test]
    fn test_stacked_entries_close_latest_first() {
        let (ledger, clock) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let student = StudentId::new();

        let first = ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        clock.advance_by(Duration::seconds(10));
        let second = ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        assert_ne!(first.visit_token, second.visit_token);
        assert_eq!(store.open_visits_for(student, Some(Zone::Male)).unwrap().len(), 2);

        clock.advance_by(Duration::seconds(5));
        let closed = ledger.close_visit(&mut store, student, Zone::Male).unwrap();
        assert_eq!(closed.id, second.id);
        assert_eq!(closed.duration.as_deref(), Some("5s"));

        let still_open = store.open_visits_for(student, Some(Zone::Male)).unwrap();
        assert_eq!(still_open, vec![first]);
    }

    #[test]
    fn test_same_instant_entries_close_most_recently_created() {
        let (ledger, _) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let student = StudentId::new();

        let first = ledger.open_visit(&mut store, student, Zone::Female).unwrap();
        let second = ledger.open_visit(&mut store, student, Zone::Female).unwrap();
        assert_eq!(first.entry_time, second.entry_time);

        let closed = ledger.close_visit(&mut store, student, Zone::Female).unwrap();
        assert_eq!(closed.id, second.id);
    }

    #[test]
    fn test_reuse_policy_returns_open_visit() {
        let (ledger, clock) = ledger(RepeatEntryPolicy::ReuseOpen);
        let mut store = MemoryStore::new();
        let student = StudentId::new();

        let first = ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        clock.advance_by(Duration::seconds(30));
        let again = ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        assert_eq!(again, first);
        assert_eq!(store.visit_count().unwrap(), 1);

        ledger.close_visit(&mut store, student, Zone::Male).unwrap();
        let fresh = ledger.open_visit(&mut store, student, Zone::Male).unwrap();
        assert_ne!(fresh.id, first.id);
        assert_eq!(store.visit_count().unwrap(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let (ledger, _) = ledger(RepeatEntryPolicy::Stack);
        let mut store = MemoryStore::new();
        let a = StudentId::new();
        let b = StudentId::new();

        ledger.open_visit(&mut store, a, Zone::Male).unwrap();
        ledger.close_visit(&mut store, a, Zone::Male).unwrap();
        ledger.open_visit(&mut store, b, Zone::Female).unwrap();

        let summary = ledger.summary(&store).unwrap();
        assert_eq!(summary.total_visits, 2);
        assert_eq!(summary.open_visits, 1);
        assert_eq!(summary.closed_visits, 1);
        assert_eq!(summary.open_by_zone[&Zone::Female], 1);
        assert_eq!(summary.open_by_zone[&Zone::Male], 0);
    }
}
