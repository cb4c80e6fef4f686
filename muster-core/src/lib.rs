//! MUSTER Core - Entity Types
//!
//! Pure data structures and leaf logic for the roster scheduling engine:
//! identity types, validated time intervals, the agent and mission entities,
//! and the derived mission-status classifier. All other crates depend on
//! this. No allocation policy lives here; conflict detection and assignment
//! belong to `muster-engine`.

pub mod agent;
pub mod error;
pub mod identity;
pub mod interval;
pub mod mission;

pub use agent::Agent;
pub use error::{
    AssignmentError, EntityType, MusterError, MusterResult, StorageError, ValidationError,
};
pub use identity::{AgentId, MissionId, Timestamp};
pub use interval::Interval;
pub use mission::{Mission, MissionStatus};
