//! Explicit mutation capability.
//!
//! Command handlers take a `Capability` value instead of consulting ambient
//! role state. The storage commit path refuses to apply a proposal without
//! the mutation capability.

use serde::{Deserialize, Serialize};

/// What the caller is allowed to do with assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    can_mutate_assignments: bool,
}

impl Capability {
    /// Read-only access: may query availability and status, never commit.
    pub fn viewer() -> Self {
        Self {
            can_mutate_assignments: false,
        }
    }

    /// Full access: may commit assignment proposals.
    pub fn operator() -> Self {
        Self {
            can_mutate_assignments: true,
        }
    }

    pub fn can_mutate_assignments(&self) -> bool {
        self.can_mutate_assignments
    }
}
