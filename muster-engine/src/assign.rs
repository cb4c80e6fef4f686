//! Assignment engines.
//!
//! The engine seam is a trait so that alternative allocators (including an
//! external LLM-backed optimizer) can be swapped in; every implementation's
//! output goes through the same proposal validation before it is trusted.
//! The built-in `GreedyPriorityEngine` is a single-pass, no-backtracking
//! allocator: once an agent is placed, no later mission can bump it.

use crate::availability::{AvailabilityIndex, ReservationSet};
use muster_core::{
    Agent, AgentId, Mission, MissionId, MissionStatus, MusterResult, Timestamp, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// One snapshot handed to an engine: the missions to place, the full agent
/// roster, and every mission on the books (for conflict checks).
///
/// Engines never mutate the snapshot; they return a proposal the caller
/// must explicitly commit.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    /// Missions to place in this batch.
    pub missions: &'a [Mission],
    /// Full agent roster.
    pub agents: &'a [Agent],
    /// Every mission on the books, including existing commitments.
    pub all_missions: &'a [Mission],
    /// Injected wall-clock instant; never read from a global clock.
    pub now: Timestamp,
}

/// A single proposed placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub mission_id: MissionId,
    pub agent_id: AgentId,
    pub notes: Option<String>,
}

/// Engine output: a best-effort placement over the input batch.
///
/// Every input mission appears exactly once across `assignments` (possibly
/// with multiple entries when multi-agent) and `unassigned`. An empty
/// candidate pool is an expected outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentProposal {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<MissionId>,
}

impl AssignmentProposal {
    /// Agents this proposal places on the given mission.
    pub fn agents_for(&self, mission_id: MissionId) -> Vec<AgentId> {
        self.assignments
            .iter()
            .filter(|a| a.mission_id == mission_id)
            .map(|a| a.agent_id)
            .collect()
    }

    /// Whether the proposal mentions the mission at all.
    pub fn covers(&self, mission_id: MissionId) -> bool {
        self.unassigned.contains(&mission_id)
            || self.assignments.iter().any(|a| a.mission_id == mission_id)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.unassigned.is_empty()
    }
}

/// Allocation strategy seam.
pub trait AssignmentEngine {
    /// Produce a placement proposal for the input snapshot.
    fn propose(&self, input: &EngineInput<'_>) -> MusterResult<AssignmentProposal>;
}

/// Configuration for the greedy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many agents to place on each mission. The settled data model is
    /// multi-agent, but one agent per mission remains the default.
    pub agents_per_mission: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            agents_per_mission: 1,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for nonsensical values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.agents_per_mission == 0 {
            return Err(ValidationError::InvalidValue {
                field: "agents_per_mission".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Greedy, priority-ordered, single-pass batch allocator.
///
/// Missions are placed in descending priority order (missing priority sorts
/// last), ties broken by earliest start, then by mission id so repeated runs
/// over identical input are deterministic. Each placement immediately
/// reserves the agent for the rest of the batch; there is no backtracking.
#[derive(Debug, Clone, Default)]
pub struct GreedyPriorityEngine {
    config: EngineConfig,
}

impl GreedyPriorityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }
}

/// Batch placement order: priority descending with missing priority last,
/// then earliest start, then mission id.
fn batch_order(a: &Mission, b: &Mission) -> Ordering {
    match (a.priority, b.priority) {
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.window.start().cmp(&b.window.start()))
    .then_with(|| a.mission_id.cmp(&b.mission_id))
}

impl AssignmentEngine for GreedyPriorityEngine {
    fn propose(&self, input: &EngineInput<'_>) -> MusterResult<AssignmentProposal> {
        self.config.validate()?;

        let index = AvailabilityIndex::new(input.agents, input.all_missions, input.now);
        let mut ordered: Vec<&Mission> = input.missions.iter().collect();
        ordered.sort_by(|a, b| batch_order(a, b));

        let mut reservations = ReservationSet::new();
        let mut proposal = AssignmentProposal::default();

        for mission in ordered {
            if mission.status_at(input.now) == MissionStatus::Completed {
                debug!(mission = %mission.mission_id, "skipping completed mission");
                proposal.unassigned.push(mission.mission_id);
                continue;
            }

            let candidates = index.available_agents(mission, &reservations);
            if candidates.is_empty() {
                debug!(mission = %mission.mission_id, "no agent available");
                proposal.unassigned.push(mission.mission_id);
                continue;
            }

            // Roster order keeps the pick deterministic.
            for agent in candidates.into_iter().take(self.config.agents_per_mission) {
                debug!(
                    mission = %mission.mission_id,
                    agent = %agent.agent_id,
                    "placed mission"
                );
                reservations.claim(mission, agent.agent_id);
                proposal.assignments.push(Assignment {
                    mission_id: mission.mission_id,
                    agent_id: agent.agent_id,
                    notes: None,
                });
            }
        }

        Ok(proposal)
    }
}
