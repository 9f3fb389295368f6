//! Credential verification
//!
//! This module contains the AccessVerifier, which resolves a credential to a
//! student and enforces the one-zone-at-a-time rule. Verification never
//! writes to the repository.

use tracing::{debug, warn};

use crate::access::{Credential, CredentialPolicy};
use crate::store::Store;
use crate::student::Student;
use crate::types::{AccessError, AccessResult, Zone};

/// Resolves credentials and checks zone occupancy
#[derive(Debug, Clone, Default)]
pub struct AccessVerifier {
    policy: CredentialPolicy,
}

impl AccessVerifier {
    /// Create a verifier applying `policy` to raw input
    pub fn new(policy: CredentialPolicy) -> Self {
        Self { policy }
    }

    /// Syntactic rules applied to raw input
    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// Parse raw terminal input into a credential
    pub fn parse(&self, raw: &str) -> AccessResult<Credential> {
        Credential::parse(raw, &self.policy)
    }

    /// Parse and verify raw terminal input
    pub fn verify_raw<R>(&self, repo: &R, raw: &str, zone: Zone) -> AccessResult<Student>
    where
        R: Store + ?Sized,
    {
        let credential = self.parse(raw)?;
        self.verify(repo, &credential, zone)
    }

    /// Resolve `credential` to a student allowed to use `zone`
    ///
    /// Scan codes are only matched against scan codes and passcodes only
    /// against passcodes. An open visit in a different zone fails with
    /// [`AccessError::ZoneConflict`]; an open visit in the same zone does not.
    pub fn verify<R>(&self, repo: &R, credential: &Credential, zone: Zone) -> AccessResult<Student>
    where
        R: Store + ?Sized,
    {
        let found = match credential {
            Credential::ScanCode(code) => repo.find_by_scan_code(code)?,
            Credential::Passcode(digits) => repo.find_by_passcode(digits)?,
        };

        let Some(student) = found else {
            warn!(credential_kind = credential.kind(), zone = %zone, "Credential not recognized");
            return Err(AccessError::NotFound { credential_kind: credential.kind() });
        };

        let open = repo.open_visits_for(student.id, None)?;
        if let Some(elsewhere) = open.iter().find(|visit| visit.zone != zone) {
            warn!(
                student_id = %student.id,
                open_zone = %elsewhere.zone,
                requested = %zone,
                "Access denied: student is in another zone"
            );
            return Err(AccessError::ZoneConflict {
                student_id: student.id,
                open_zone: elsewhere.zone,
                requested: zone,
            });
        }

        debug!(
            student_id = %student.id,
            zone = %zone,
            open_here = open.len(),
            "Credential verified"
        );
        Ok(student)
    }
}
