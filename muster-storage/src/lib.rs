//! MUSTER Storage - Repository Traits and In-Memory Store
//!
//! Defines the storage abstraction the core is written against, so the
//! engine never assumes a singleton mutable global. Reads return fresh
//! cloned snapshots; writes go through explicit update payloads. The
//! `InMemoryStore` is the reference implementation and the test backend;
//! a persistent backend implements the same traits.

use chrono::Utc;
use muster_core::{
    Agent, AgentId, EntityType, Mission, MissionId, MissionStatus, MusterResult, StorageError,
    Timestamp,
};
use muster_engine::{AssignmentProposal, Capability};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for agents. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub registration_number: Option<String>,
    pub rank: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub skills: Option<BTreeSet<String>>,
}

/// Update payload for missions. `None` fields are left untouched.
///
/// `priority` and `notes` are optional on the mission itself, so their
/// update fields are doubled: the outer `None` leaves the stored value
/// untouched, `Some(None)` clears it, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct MissionUpdate {
    pub name: Option<String>,
    pub details: Option<String>,
    pub priority: Option<Option<i32>>,
    pub notes: Option<Option<String>>,
    /// Replaces the assignment list; duplicates are dropped, order kept.
    pub agent_ids: Option<Vec<AgentId>>,
    /// End-date extension. The start never moves; an end at or before the
    /// start is rejected.
    pub end: Option<Timestamp>,
    pub required_skills: Option<BTreeSet<String>>,
}

// ============================================================================
// REPOSITORY TRAITS
// ============================================================================

/// Repository for roster agents.
pub trait AgentRepository: Send + Sync {
    /// Insert a new agent. Fails if the registration number is taken.
    fn agent_insert(&self, agent: &Agent) -> MusterResult<()>;

    /// Get an agent by id.
    fn agent_get(&self, id: AgentId) -> MusterResult<Option<Agent>>;

    /// Update an agent.
    fn agent_update(&self, id: AgentId, update: AgentUpdate) -> MusterResult<()>;

    /// Delete an agent, retracting its id from every mission's assignment
    /// list in the same operation. No dangling references survive.
    fn agent_delete(&self, id: AgentId) -> MusterResult<()>;

    /// Snapshot of the full roster.
    fn agent_list(&self) -> MusterResult<Vec<Agent>>;

    /// Whether a registration number is already in use, optionally excluding
    /// one agent (the one being edited).
    fn registration_number_taken(
        &self,
        registration_number: &str,
        excluding: Option<AgentId>,
    ) -> MusterResult<bool>;
}

/// Repository for missions.
pub trait MissionRepository: Send + Sync {
    /// Insert a new mission.
    fn mission_insert(&self, mission: &Mission) -> MusterResult<()>;

    /// Get a mission by id.
    fn mission_get(&self, id: MissionId) -> MusterResult<Option<Mission>>;

    /// Update a mission.
    fn mission_update(&self, id: MissionId, update: MissionUpdate) -> MusterResult<()>;

    /// Delete a mission. No cascading effect on agents.
    fn mission_delete(&self, id: MissionId) -> MusterResult<()>;

    /// Snapshot of all missions.
    fn mission_list(&self) -> MusterResult<Vec<Mission>>;

    /// Missions whose derived status at `now` matches.
    fn mission_list_by_status(
        &self,
        status: MissionStatus,
        now: Timestamp,
    ) -> MusterResult<Vec<Mission>>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory store backing both repositories.
///
/// Lock order: any path taking both maps locks `agents` before `missions`.
/// Every other path takes at most one of the two.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
    missions: Arc<RwLock<HashMap<MissionId, Mission>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) -> MusterResult<()> {
        self.agents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        self.missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// Count of stored agents.
    pub fn agent_count(&self) -> MusterResult<usize> {
        Ok(self
            .agents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }

    /// Count of stored missions.
    pub fn mission_count(&self) -> MusterResult<usize> {
        Ok(self
            .missions
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .len())
    }

    /// Apply a validated assignment proposal in one critical section.
    ///
    /// Assigned agents are merged into each mission's list set-wise;
    /// missions in the `unassigned` list get their assignment cleared (the
    /// batch dialog semantics). All mission ids are verified before any
    /// record is touched, so two operators cannot interleave a partial
    /// write. The proposal itself is advisory; callers re-validate against
    /// a fresh snapshot before committing.
    pub fn commit_proposal(
        &self,
        proposal: &AssignmentProposal,
        capability: Capability,
    ) -> MusterResult<()> {
        if !capability.can_mutate_assignments() {
            return Err(StorageError::PermissionDenied {
                action: "commit assignment proposal".to_string(),
            }
            .into());
        }

        let mut missions = self
            .missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        // Verify everything up front; nothing is mutated on failure.
        let referenced = proposal
            .assignments
            .iter()
            .map(|a| a.mission_id)
            .chain(proposal.unassigned.iter().copied());
        for mission_id in referenced {
            if !missions.contains_key(&mission_id) {
                return Err(StorageError::NotFound {
                    entity_type: EntityType::Mission,
                    id: mission_id.to_string(),
                }
                .into());
            }
        }

        for assignment in &proposal.assignments {
            let mission = missions
                .get_mut(&assignment.mission_id)
                .expect("verified above");
            mission.assign_agent(assignment.agent_id);
            if let Some(notes) = &assignment.notes {
                mission.notes = Some(notes.clone());
                mission.updated_at = Utc::now();
            }
        }
        for mission_id in &proposal.unassigned {
            let mission = missions.get_mut(mission_id).expect("verified above");
            if !mission.agent_ids.is_empty() {
                mission.agent_ids.clear();
                mission.updated_at = Utc::now();
            }
        }

        Ok(())
    }
}

impl AgentRepository for InMemoryStore {
    fn agent_insert(&self, agent: &Agent) -> MusterResult<()> {
        let mut agents = self
            .agents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let taken = agents.values().any(|a| {
            a.registration_number == agent.registration_number && a.agent_id != agent.agent_id
        });
        if taken {
            return Err(StorageError::RegistrationNumberTaken {
                registration_number: agent.registration_number.clone(),
            }
            .into());
        }
        agents.insert(agent.agent_id, agent.clone());
        Ok(())
    }

    fn agent_get(&self, id: AgentId) -> MusterResult<Option<Agent>> {
        Ok(self
            .agents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .get(&id)
            .cloned())
    }

    fn agent_update(&self, id: AgentId, update: AgentUpdate) -> MusterResult<()> {
        let mut agents = self
            .agents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        if let Some(registration_number) = &update.registration_number {
            let taken = agents
                .values()
                .any(|a| a.registration_number == *registration_number && a.agent_id != id);
            if taken {
                return Err(StorageError::RegistrationNumberTaken {
                    registration_number: registration_number.clone(),
                }
                .into());
            }
        }

        let agent = agents.get_mut(&id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Agent,
            id: id.to_string(),
        })?;

        if let Some(first_name) = update.first_name {
            agent.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            agent.last_name = last_name;
        }
        if let Some(registration_number) = update.registration_number {
            agent.registration_number = registration_number;
        }
        if let Some(rank) = update.rank {
            agent.rank = rank;
        }
        if let Some(contact_number) = update.contact_number {
            agent.contact_number = contact_number;
        }
        if let Some(address) = update.address {
            agent.address = address;
        }
        if let Some(skills) = update.skills {
            agent.skills = skills;
        }
        agent.updated_at = Utc::now();
        Ok(())
    }

    fn agent_delete(&self, id: AgentId) -> MusterResult<()> {
        // Both locks held for the whole operation (agents first, per the
        // documented order) so no reader can observe the agent gone while a
        // mission still references it.
        let mut agents = self
            .agents
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut missions = self
            .missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        if agents.remove(&id).is_none() {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Agent,
                id: id.to_string(),
            }
            .into());
        }
        // Cascade: strip the deleted agent from every mission so no mission
        // is left holding a dangling reference.
        for mission in missions.values_mut() {
            mission.unassign_agent(id);
        }
        Ok(())
    }

    fn agent_list(&self) -> MusterResult<Vec<Agent>> {
        let agents = self
            .agents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut list: Vec<Agent> = agents.values().cloned().collect();
        list.sort_by_key(|a| a.agent_id);
        Ok(list)
    }

    fn registration_number_taken(
        &self,
        registration_number: &str,
        excluding: Option<AgentId>,
    ) -> MusterResult<bool> {
        let agents = self
            .agents
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(agents.values().any(|a| {
            a.registration_number == registration_number && Some(a.agent_id) != excluding
        }))
    }
}

impl MissionRepository for InMemoryStore {
    fn mission_insert(&self, mission: &Mission) -> MusterResult<()> {
        self.missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(mission.mission_id, mission.clone());
        Ok(())
    }

    fn mission_get(&self, id: MissionId) -> MusterResult<Option<Mission>> {
        Ok(self
            .missions
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .get(&id)
            .cloned())
    }

    fn mission_update(&self, id: MissionId, update: MissionUpdate) -> MusterResult<()> {
        let mut missions = self
            .missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mission = missions.get_mut(&id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Mission,
            id: id.to_string(),
        })?;

        if let Some(end) = update.end {
            mission.extend_end(end)?;
        }
        if let Some(name) = update.name {
            mission.name = name;
        }
        if let Some(details) = update.details {
            mission.details = details;
        }
        if let Some(priority) = update.priority {
            mission.priority = priority;
        }
        if let Some(notes) = update.notes {
            mission.notes = notes;
        }
        if let Some(agent_ids) = update.agent_ids {
            let mut seen = BTreeSet::new();
            mission.agent_ids = agent_ids
                .into_iter()
                .filter(|id| seen.insert(*id))
                .collect();
        }
        if let Some(required_skills) = update.required_skills {
            mission.required_skills = required_skills;
        }
        mission.updated_at = Utc::now();
        Ok(())
    }

    fn mission_delete(&self, id: MissionId) -> MusterResult<()> {
        let mut missions = self
            .missions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if missions.remove(&id).is_none() {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Mission,
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn mission_list(&self) -> MusterResult<Vec<Mission>> {
        let missions = self
            .missions
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut list: Vec<Mission> = missions.values().cloned().collect();
        list.sort_by_key(|m| m.mission_id);
        Ok(list)
    }

    fn mission_list_by_status(
        &self,
        status: MissionStatus,
        now: Timestamp,
    ) -> MusterResult<Vec<Mission>> {
        Ok(self
            .mission_list()?
            .into_iter()
            .filter(|m| m.status_at(now) == status)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::MusterError;
    use muster_engine::Assignment;
    use muster_test_utils::{day, mission_spanning, sample_agent};

    #[test]
    fn test_agent_insert_get_roundtrip() {
        let store = InMemoryStore::new();
        let agent = sample_agent("Jean", "Dupont");
        store.agent_insert(&agent).unwrap();
        assert_eq!(store.agent_get(agent.agent_id).unwrap(), Some(agent));
    }

    #[test]
    fn test_registration_number_uniqueness_on_insert() {
        let store = InMemoryStore::new();
        store.agent_insert(&sample_agent("Jean", "Dupont")).unwrap();

        let duplicate = sample_agent("Jean", "Martin");
        let err = store.agent_insert(&duplicate).unwrap_err();
        assert!(matches!(
            err,
            MusterError::Storage(StorageError::RegistrationNumberTaken { .. })
        ));
    }

    #[test]
    fn test_registration_number_uniqueness_on_update() {
        let store = InMemoryStore::new();
        let jean = sample_agent("Jean", "Dupont");
        let marie = sample_agent("Marie", "Curie");
        store.agent_insert(&jean).unwrap();
        store.agent_insert(&marie).unwrap();

        let err = store
            .agent_update(
                marie.agent_id,
                AgentUpdate {
                    registration_number: Some(jean.registration_number.clone()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            MusterError::Storage(StorageError::RegistrationNumberTaken { .. })
        ));

        // Re-saving an agent's own number is not a collision.
        assert!(!store
            .registration_number_taken(&marie.registration_number, Some(marie.agent_id))
            .unwrap());
    }

    #[test]
    fn test_agent_delete_cascades_to_missions() {
        let store = InMemoryStore::new();
        let agent = sample_agent("Jean", "Dupont");
        let other = sample_agent("Marie", "Curie");
        store.agent_insert(&agent).unwrap();
        store.agent_insert(&other).unwrap();

        let mut m1 = mission_spanning("m1", 0, 5);
        m1.assign_agent(agent.agent_id);
        m1.assign_agent(other.agent_id);
        let mut m2 = mission_spanning("m2", 6, 9);
        m2.assign_agent(agent.agent_id);
        store.mission_insert(&m1).unwrap();
        store.mission_insert(&m2).unwrap();

        store.agent_delete(agent.agent_id).unwrap();

        for mission in store.mission_list().unwrap() {
            assert!(!mission.is_assigned_to(agent.agent_id));
        }
        // Other assignments survive.
        assert!(store
            .mission_get(m1.mission_id)
            .unwrap()
            .unwrap()
            .is_assigned_to(other.agent_id));
    }

    #[test]
    fn test_mission_end_extension_validated() {
        let store = InMemoryStore::new();
        let mission = mission_spanning("m", 0, 5);
        store.mission_insert(&mission).unwrap();

        store
            .mission_update(
                mission.mission_id,
                MissionUpdate {
                    end: Some(day(8)),
                    ..Default::default()
                },
            )
            .unwrap();
        let stored = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(stored.window.end(), day(8));

        let err = store
            .mission_update(
                mission.mission_id,
                MissionUpdate {
                    end: Some(day(-1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, MusterError::Validation(_)));
    }

    #[test]
    fn test_agent_delete_never_exposes_dangling_reference() {
        // Readers snapshot agents before missions. With the cascade running
        // under both write locks, a mission can then never reference an
        // agent absent from the earlier agents snapshot.
        let store = InMemoryStore::new();
        let agents: Vec<_> = (0..8)
            .map(|i| sample_agent(&format!("Agent{i}"), "Durand"))
            .collect();
        for (i, agent) in agents.iter().enumerate() {
            store.agent_insert(agent).unwrap();
            let mut mission = mission_spanning(&format!("m{i}"), 0, 5);
            mission.assign_agent(agent.agent_id);
            store.mission_insert(&mission).unwrap();
        }

        let writer = {
            let store = store.clone();
            let ids: Vec<_> = agents.iter().map(|a| a.agent_id).collect();
            std::thread::spawn(move || {
                for id in ids {
                    store.agent_delete(id).unwrap();
                }
            })
        };

        while store.agent_count().unwrap() > 0 {
            let known: std::collections::HashSet<_> = store
                .agent_list()
                .unwrap()
                .into_iter()
                .map(|a| a.agent_id)
                .collect();
            for mission in store.mission_list().unwrap() {
                for agent_id in &mission.agent_ids {
                    assert!(known.contains(agent_id));
                }
            }
        }
        writer.join().unwrap();

        for mission in store.mission_list().unwrap() {
            assert!(mission.agent_ids.is_empty());
        }
    }

    #[test]
    fn test_mission_update_clears_priority_and_notes() {
        let store = InMemoryStore::new();
        let mission = mission_spanning("m", 0, 5)
            .with_priority(5)
            .with_notes("night rotation");
        store.mission_insert(&mission).unwrap();

        // Outer None leaves both fields untouched.
        store
            .mission_update(mission.mission_id, MissionUpdate::default())
            .unwrap();
        let stored = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(stored.priority, Some(5));
        assert_eq!(stored.notes.as_deref(), Some("night rotation"));

        store
            .mission_update(
                mission.mission_id,
                MissionUpdate {
                    priority: Some(None),
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        let cleared = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(cleared.priority, None);
        assert_eq!(cleared.notes, None);

        store
            .mission_update(
                mission.mission_id,
                MissionUpdate {
                    priority: Some(Some(2)),
                    ..Default::default()
                },
            )
            .unwrap();
        let stored = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(stored.priority, Some(2));
    }

    #[test]
    fn test_mission_update_deduplicates_agent_ids() {
        let store = InMemoryStore::new();
        let mission = mission_spanning("m", 0, 5);
        store.mission_insert(&mission).unwrap();

        let a = AgentId::new();
        let b = AgentId::new();
        store
            .mission_update(
                mission.mission_id,
                MissionUpdate {
                    agent_ids: Some(vec![a, b, a]),
                    ..Default::default()
                },
            )
            .unwrap();
        let stored = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(stored.agent_ids, vec![a, b]);
    }

    #[test]
    fn test_mission_list_by_status() {
        let store = InMemoryStore::new();
        store.mission_insert(&mission_spanning("past", 0, 2)).unwrap();
        store
            .mission_insert(&mission_spanning("current", 3, 7))
            .unwrap();
        store
            .mission_insert(&mission_spanning("future", 10, 12))
            .unwrap();

        let now = day(5);
        assert_eq!(
            store
                .mission_list_by_status(MissionStatus::Active, now)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .mission_list_by_status(MissionStatus::Completed, now)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .mission_list_by_status(MissionStatus::Upcoming, now)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_commit_proposal_merges_and_clears() {
        let store = InMemoryStore::new();
        let agent = sample_agent("Jean", "Dupont");
        store.agent_insert(&agent).unwrap();

        let mut assigned = mission_spanning("assigned", 0, 5);
        let existing_agent = AgentId::new();
        assigned.assign_agent(existing_agent);
        let cleared = mission_spanning("cleared", 6, 9);
        let mut cleared_stored = cleared.clone();
        cleared_stored.assign_agent(AgentId::new());
        store.mission_insert(&assigned).unwrap();
        store.mission_insert(&cleared_stored).unwrap();

        let proposal = AssignmentProposal {
            assignments: vec![Assignment {
                mission_id: assigned.mission_id,
                agent_id: agent.agent_id,
                notes: Some("night rotation".to_string()),
            }],
            unassigned: vec![cleared.mission_id],
        };
        store
            .commit_proposal(&proposal, Capability::operator())
            .unwrap();

        let merged = store.mission_get(assigned.mission_id).unwrap().unwrap();
        assert_eq!(merged.agent_ids, vec![existing_agent, agent.agent_id]);
        assert_eq!(merged.notes.as_deref(), Some("night rotation"));

        let emptied = store.mission_get(cleared.mission_id).unwrap().unwrap();
        assert!(emptied.agent_ids.is_empty());
    }

    #[test]
    fn test_commit_proposal_requires_capability() {
        let store = InMemoryStore::new();
        let mission = mission_spanning("m", 0, 5);
        store.mission_insert(&mission).unwrap();

        let proposal = AssignmentProposal {
            assignments: vec![],
            unassigned: vec![mission.mission_id],
        };
        let err = store
            .commit_proposal(&proposal, Capability::viewer())
            .unwrap_err();
        assert!(matches!(
            err,
            MusterError::Storage(StorageError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_commit_proposal_unknown_mission_mutates_nothing() {
        let store = InMemoryStore::new();
        let mut mission = mission_spanning("m", 0, 5);
        let holder = AgentId::new();
        mission.assign_agent(holder);
        store.mission_insert(&mission).unwrap();

        let proposal = AssignmentProposal {
            assignments: vec![],
            unassigned: vec![mission.mission_id, MissionId::new()],
        };
        let err = store
            .commit_proposal(&proposal, Capability::operator())
            .unwrap_err();
        assert!(matches!(
            err,
            MusterError::Storage(StorageError::NotFound { .. })
        ));

        // The known mission kept its assignment.
        let stored = store.mission_get(mission.mission_id).unwrap().unwrap();
        assert_eq!(stored.agent_ids, vec![holder]);
    }

    #[test]
    fn test_clear_and_counts() {
        let store = InMemoryStore::new();
        store.agent_insert(&sample_agent("Jean", "Dupont")).unwrap();
        store.mission_insert(&mission_spanning("m", 0, 5)).unwrap();
        assert_eq!(store.agent_count().unwrap(), 1);
        assert_eq!(store.mission_count().unwrap(), 1);

        store.clear().unwrap();
        assert_eq!(store.agent_count().unwrap(), 0);
        assert_eq!(store.mission_count().unwrap(), 0);
    }
}
