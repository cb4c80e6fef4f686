//! Availability queries over a roster snapshot.
//!
//! `AvailabilityIndex` answers "which agents could take this mission" for
//! the interactive assignment path, combining committed-mission conflicts
//! with transient in-batch reservations. Reservations exist because a single
//! operator action may assign several missions before anything is persisted;
//! they are scoped to that one operation and discarded afterward.

use crate::conflict::has_conflict;
use muster_core::{Agent, AgentId, Interval, Mission, MissionId, MissionStatus, Timestamp};

/// Transient per-operation claims of agents by missions.
///
/// Never written to storage; build one per batch operation and drop it when
/// the batch is committed or abandoned.
#[derive(Debug, Clone, Default)]
pub struct ReservationSet {
    claims: Vec<Claim>,
}

#[derive(Debug, Clone)]
struct Claim {
    mission_id: MissionId,
    agent_id: AgentId,
    window: Interval,
}

impl ReservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `agent_id` has been provisionally taken by `mission`.
    pub fn claim(&mut self, mission: &Mission, agent_id: AgentId) {
        self.claims.push(Claim {
            mission_id: mission.mission_id,
            agent_id,
            window: mission.window,
        });
    }

    /// Drop any claim held by the given mission, e.g. when the operator
    /// changes a selection before saving.
    pub fn release(&mut self, mission_id: MissionId) {
        self.claims.retain(|c| c.mission_id != mission_id);
    }

    /// Whether an overlapping claim from a different mission blocks
    /// `agent_id` for `candidate`.
    ///
    /// A claim made by the candidate mission itself never blocks it.
    pub fn blocks(&self, agent_id: AgentId, candidate: &Mission) -> bool {
        self.claims.iter().any(|c| {
            c.mission_id != candidate.mission_id
                && c.agent_id == agent_id
                && c.window.overlaps(&candidate.window)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }
}

/// Snapshot-scoped availability view.
///
/// Holds borrows of a fully-materialized snapshot; it never re-reads the
/// underlying store. Callers wanting fresh answers rebuild the index from a
/// fresh snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityIndex<'a> {
    agents: &'a [Agent],
    missions: &'a [Mission],
    now: Timestamp,
}

impl<'a> AvailabilityIndex<'a> {
    pub fn new(agents: &'a [Agent], missions: &'a [Mission], now: Timestamp) -> Self {
        Self {
            agents,
            missions,
            now,
        }
    }

    /// Agents free to take `candidate`: no committed conflict, no overlapping
    /// in-batch reservation, and (when the candidate declares required
    /// skills) a covering skill set.
    ///
    /// A Completed candidate trivially reports every agent available; such
    /// missions are not assignable in practice, but the predicate must not
    /// misbehave when handed one.
    pub fn available_agents(
        &self,
        candidate: &Mission,
        reservations: &ReservationSet,
    ) -> Vec<&'a Agent> {
        if candidate.status_at(self.now) == MissionStatus::Completed {
            return self.agents.iter().collect();
        }

        self.agents
            .iter()
            .filter(|agent| {
                agent.has_skills(&candidate.required_skills)
                    && !has_conflict(agent.agent_id, candidate, self.missions, self.now)
                    && !reservations.blocks(agent.agent_id, candidate)
            })
            .collect()
    }

    /// Whether a specific agent is free to take `candidate`.
    pub fn is_available(
        &self,
        agent: &Agent,
        candidate: &Mission,
        reservations: &ReservationSet,
    ) -> bool {
        if candidate.status_at(self.now) == MissionStatus::Completed {
            return true;
        }
        agent.has_skills(&candidate.required_skills)
            && !has_conflict(agent.agent_id, candidate, self.missions, self.now)
            && !reservations.blocks(agent.agent_id, candidate)
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }
}
