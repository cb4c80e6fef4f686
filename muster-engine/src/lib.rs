//! MUSTER Engine - Conflict Detection and Assignment
//!
//! The allocation core: interval-conflict detection over an agent's
//! commitments, snapshot-scoped availability queries, and the greedy
//! priority-ordered batch allocator. Everything here is pure synchronous
//! computation over fully-materialized snapshots; fetching and committing
//! belong to the caller and to `muster-storage`.

pub mod assign;
pub mod availability;
pub mod capability;
pub mod conflict;
pub mod validate;

pub use assign::{
    Assignment, AssignmentEngine, AssignmentProposal, EngineConfig, EngineInput,
    GreedyPriorityEngine,
};
pub use availability::{AvailabilityIndex, ReservationSet};
pub use capability::Capability;
pub use conflict::{conflicting_missions, has_conflict};
pub use validate::{check_manual_assignment, validate_proposal};
