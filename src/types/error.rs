//! Error types and handling
//!
//! This module contains the error taxonomy shared by the directory, the
//! access verifier, the visit ledger and the storage layer.

use crate::types::{StudentId, Zone};
use thiserror::Error;

/// Errors raised by a repository implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key is already taken
    #[error("Duplicate {entity} key: {key}")]
    DuplicateKey {
        /// Entity kind ("student", "visit")
        entity: &'static str,
        /// Offending key value
        key: String,
    },

    /// An update targeted a record that does not exist
    #[error("{entity} not found: {id}")]
    RecordNotFound {
        /// Entity kind ("student", "visit")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Errors raised while loading a roster file
#[derive(Debug, Error)]
pub enum RosterError {
    /// Roster file not found
    #[error("Roster file not found: {0}")]
    FileNotFound(String),

    /// Roster file read error
    #[error("Failed to read roster file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse roster: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported roster file format
    #[error("Unsupported roster file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Errors reported to the terminal for a failed operation
///
/// None of these are fatal. A failed operation leaves the directory and the
/// ledger exactly as they were before the call.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Credential does not resolve to any student
    #[error("No student matches the presented {credential_kind}")]
    NotFound {
        /// "scan code" or "passcode"
        credential_kind: &'static str,
    },

    /// Student is already inside a different zone
    #[error("Student {student_id} already has an open visit in zone {open_zone}, cannot use {requested}")]
    ZoneConflict {
        /// Student being verified
        student_id: StudentId,
        /// Zone of the existing open visit
        open_zone: Zone,
        /// Zone presented at the terminal
        requested: Zone,
    },

    /// Exit attempted with nothing open for the student in the zone
    #[error("Student {student_id} has no open visit in zone {zone}")]
    NoOpenVisit {
        /// Student attempting to exit
        student_id: StudentId,
        /// Zone of the terminal
        zone: Zone,
    },

    /// Enrollment number already registered
    #[error("Enrollment number already registered: {0}")]
    DuplicateEnrollment(String),

    /// Credential rejected before lookup; carries the kiosk text
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Required registration field was empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Could not generate a credential that is not already taken
    #[error("Could not generate a unique {credential_kind} after {attempts} attempts")]
    CredentialSpaceExhausted {
        /// "scan code" or "passcode"
        credential_kind: &'static str,
        /// Attempts made before giving up
        attempts: usize,
    },

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Roster loading failure
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

impl AccessError {
    /// Stable machine-readable name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            AccessError::NotFound { .. } => "not_found",
            AccessError::ZoneConflict { .. } => "zone_conflict",
            AccessError::NoOpenVisit { .. } => "no_open_visit",
            AccessError::DuplicateEnrollment(_) => "duplicate_enrollment",
            AccessError::InvalidCredential(_) => "invalid_credential",
            AccessError::MissingField(_) => "missing_field",
            AccessError::CredentialSpaceExhausted { .. } => "credential_space_exhausted",
            AccessError::Store(_) => "store",
            AccessError::Roster(_) => "roster",
        }
    }

    /// Message shown to the student or administrator at the terminal
    pub fn user_message(&self) -> String {
        match self {
            AccessError::NotFound { .. } => "Aluno não encontrado".to_string(),
            AccessError::ZoneConflict { .. } => "Você já está em outro banheiro".to_string(),
            AccessError::NoOpenVisit { .. } => "Nenhum registro de entrada encontrado".to_string(),
            AccessError::DuplicateEnrollment(_) => {
                "Já existe um aluno com esta matrícula".to_string()
            }
            AccessError::InvalidCredential(reason) => reason.clone(),
            AccessError::MissingField(_) => {
                "Preencha todos os campos para cadastrar o aluno".to_string()
            }
            AccessError::CredentialSpaceExhausted { .. } => {
                "Não foi possível gerar uma credencial para o aluno".to_string()
            }
            AccessError::Store(_) => "Não foi possível verificar o acesso".to_string(),
            AccessError::Roster(_) => "Erro ao importar o arquivo".to_string(),
        }
    }

    /// Check if the caller can simply reset its input and let the user retry
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AccessError::Store(StoreError::Poisoned))
    }
}

/// Result type for terminal operations
pub type AccessResult<T> = Result<T, AccessError>;

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;
