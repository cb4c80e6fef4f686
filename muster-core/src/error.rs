//! Error types for MUSTER operations

use crate::{AgentId, MissionId, Timestamp};
use thiserror::Error;

/// Entity type discriminator for storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Agent,
    Mission,
}

/// Validation errors raised on malformed input, before any scheduling logic runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors found when validating an assignment proposal against a snapshot.
///
/// An unplaceable mission is NOT an error; it is reported through the
/// proposal's `unassigned` list. These variants only cover proposals that
/// are internally inconsistent or reference unknown entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Proposal references unknown mission {mission_id}")]
    UnknownMission { mission_id: MissionId },

    #[error("Proposal references unknown agent {agent_id}")]
    UnknownAgent { agent_id: AgentId },

    #[error("Mission {mission_id} missing from proposal output")]
    MissingMission { mission_id: MissionId },

    #[error("Mission {mission_id} appears more than once across assignments and unassigned")]
    DuplicateMission { mission_id: MissionId },

    #[error("Agent {agent_id} double-booked on overlapping missions {first} and {second}")]
    DoubleBooked {
        agent_id: AgentId,
        first: MissionId,
        second: MissionId,
    },

    #[error("Agent {agent_id} lacks required skills for mission {mission_id}")]
    SkillMismatch {
        agent_id: AgentId,
        mission_id: MissionId,
    },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: String },

    #[error("Registration number {registration_number} is already taken")]
    RegistrationNumberTaken { registration_number: String },

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all MUSTER errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MusterError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for MUSTER operations.
pub type MusterResult<T> = Result<T, MusterError>;
