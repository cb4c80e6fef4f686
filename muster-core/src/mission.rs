//! Mission entity and derived lifecycle status.

use crate::{AgentId, Interval, MissionId, Timestamp, ValidationError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Derived lifecycle state of a mission. Never persisted, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionStatus {
    Upcoming,
    Active,
    Completed,
}

impl MissionStatus {
    /// Classify a mission window against `now`.
    ///
    /// Boundary ties resolve toward Active on both sides: a mission starting
    /// exactly at `now` is Active, and a mission ending exactly at `now` is
    /// still Active. Only a strictly-past end counts as Completed.
    pub fn classify(window: &Interval, now: Timestamp) -> Self {
        if window.end() < now {
            MissionStatus::Completed
        } else if window.start() > now {
            MissionStatus::Upcoming
        } else {
            MissionStatus::Active
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::Upcoming => write!(f, "Upcoming"),
            MissionStatus::Active => write!(f, "Active"),
            MissionStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// A time-boxed task that zero or more agents can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub mission_id: MissionId,
    pub name: String,
    pub details: String,
    /// Validated time window; end is strictly after start.
    pub window: Interval,
    /// Higher number means more urgent. Missions without a priority sort
    /// after any prioritized mission in batch assignment.
    pub priority: Option<i32>,
    /// Assigned agents, ordered, duplicate-free. Maintained through
    /// `assign_agent` / `unassign_agent` / `toggle_agent`.
    pub agent_ids: Vec<AgentId>,
    /// Skill tags an agent must cover to be considered for this mission.
    pub required_skills: BTreeSet<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Mission {
    /// Create a new mission with an empty assignment list.
    pub fn new(name: impl Into<String>, details: impl Into<String>, window: Interval) -> Self {
        let now = Utc::now();
        Self {
            mission_id: MissionId::new(),
            name: name.into(),
            details: details.into(),
            window,
            priority: None,
            agent_ids: Vec::new(),
            required_skills: BTreeSet::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Add a required skill tag.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.insert(skill.into());
        self
    }

    /// Set free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Lifecycle status at the given instant.
    pub fn status_at(&self, now: Timestamp) -> MissionStatus {
        MissionStatus::classify(&self.window, now)
    }

    /// Whether the given agent is on this mission.
    pub fn is_assigned_to(&self, agent_id: AgentId) -> bool {
        self.agent_ids.contains(&agent_id)
    }

    /// Add an agent to the assignment list. Returns false if already present.
    pub fn assign_agent(&mut self, agent_id: AgentId) -> bool {
        if self.is_assigned_to(agent_id) {
            return false;
        }
        self.agent_ids.push(agent_id);
        self.updated_at = Utc::now();
        true
    }

    /// Remove an agent from the assignment list. Returns false if absent.
    pub fn unassign_agent(&mut self, agent_id: AgentId) -> bool {
        let before = self.agent_ids.len();
        self.agent_ids.retain(|id| *id != agent_id);
        if self.agent_ids.len() == before {
            return false;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Flip the agent's membership. Returns true if now assigned.
    pub fn toggle_agent(&mut self, agent_id: AgentId) -> bool {
        if self.unassign_agent(agent_id) {
            false
        } else {
            self.assign_agent(agent_id);
            true
        }
    }

    /// Extend (or shorten) the mission by replacing the end instant only.
    ///
    /// The start never moves; a `new_end` at or before the start is rejected.
    pub fn extend_end(&mut self, new_end: Timestamp) -> Result<(), ValidationError> {
        self.window = self.window.with_end(new_end)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
