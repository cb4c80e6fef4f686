//! Agent entity - a person available for mission assignment.

use crate::{AgentId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A roster member, identified by a unique registration number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub first_name: String,
    pub last_name: String,
    /// The "matricule". Unique across all agents; enforced by the repository.
    pub registration_number: String,
    pub rank: String,
    pub contact_number: String,
    pub address: String,
    /// Skill tags. Empty means no declared skills.
    pub skills: BTreeSet<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Agent {
    /// Create a new agent with a fresh id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        registration_number: impl Into<String>,
        rank: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            agent_id: AgentId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            registration_number: registration_number.into(),
            rank: rank.into(),
            contact_number: String::new(),
            address: String::new(),
            skills: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the contact number.
    pub fn with_contact_number(mut self, contact: impl Into<String>) -> Self {
        self.contact_number = contact.into();
        self
    }

    /// Set the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Add a skill tag.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    /// Replace the skill set.
    pub fn with_skills(mut self, skills: BTreeSet<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Full display name, "First Last".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this agent declares a superset of `required` skills.
    pub fn has_skills(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.skills)
    }
}
