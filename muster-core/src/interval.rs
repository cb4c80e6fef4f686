//! Time intervals and the overlap test.
//!
//! Every mission carries a validated `Interval`. The overlap test is the
//! strict-inequality form: two intervals that only touch at a boundary do
//! not overlap, so an agent finishing a mission at instant T can start
//! another mission at T without a conflict being flagged.

use crate::{Timestamp, ValidationError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated time span with `end` strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    start: Timestamp,
    end: Timestamp,
}

impl Interval {
    /// Create a new interval.
    ///
    /// Rejects `end <= start` with a descriptive error. Values are never
    /// swapped or clamped on the caller's behalf.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Length of the interval. Always positive by construction.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Strict overlap test: `self.start < other.end && self.end > other.start`.
    ///
    /// Commutative and pure. Back-to-back intervals sharing only a boundary
    /// instant are NOT overlapping.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whether `t` falls within the interval, inclusive at both boundaries.
    ///
    /// This is the same boundary rule the status classifier uses for Active.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }

    /// Replace the end instant, keeping the start.
    ///
    /// Used by the mission-extension path. Rejects `new_end <= start`.
    pub fn with_end(&self, new_end: Timestamp) -> Result<Self, ValidationError> {
        Self::new(self.start, new_end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}
