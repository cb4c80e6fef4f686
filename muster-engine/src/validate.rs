//! Proposal validation.
//!
//! Every proposal is checked against the same snapshot it was produced
//! from before being committed, no matter which engine produced it. The
//! built-in greedy engine cannot violate these rules by construction, but
//! an external optimizer (e.g. an LLM-backed one) offers no such guarantee,
//! and a caller bypassing the availability filter must still be caught.

use crate::assign::{AssignmentProposal, EngineInput};
use crate::conflict::conflicting_missions;
use muster_core::{Agent, AssignmentError, Mission, MissionStatus};
use std::collections::{HashMap, HashSet};

/// Validate a proposal against the snapshot it was computed from.
///
/// Checks, in order:
/// - every referenced mission and agent exists in the snapshot,
/// - no `(mission, agent)` pair is proposed twice and no mission sits in
///   both `assignments` and `unassigned`,
/// - every batch mission is covered exactly once,
/// - no agent ends up on two overlapping non-Completed missions, counting
///   both in-proposal placements and existing commitments,
/// - required skills are covered by each placed agent.
pub fn validate_proposal(
    proposal: &AssignmentProposal,
    input: &EngineInput<'_>,
) -> Result<(), AssignmentError> {
    let batch: HashMap<_, _> = input
        .missions
        .iter()
        .map(|m| (m.mission_id, m))
        .collect();
    let agents: HashMap<_, _> = input.agents.iter().map(|a| (a.agent_id, a)).collect();

    // Unknown references and duplicate pairs.
    let mut seen_pairs = HashSet::new();
    for assignment in &proposal.assignments {
        let mission = *batch
            .get(&assignment.mission_id)
            .ok_or(AssignmentError::UnknownMission {
                mission_id: assignment.mission_id,
            })?;
        let agent = *agents
            .get(&assignment.agent_id)
            .ok_or(AssignmentError::UnknownAgent {
                agent_id: assignment.agent_id,
            })?;

        if !seen_pairs.insert((assignment.mission_id, assignment.agent_id)) {
            return Err(AssignmentError::DuplicateMission {
                mission_id: assignment.mission_id,
            });
        }

        if !agent.has_skills(&mission.required_skills) {
            return Err(AssignmentError::SkillMismatch {
                agent_id: agent.agent_id,
                mission_id: mission.mission_id,
            });
        }
    }
    for mission_id in &proposal.unassigned {
        if !batch.contains_key(mission_id) {
            return Err(AssignmentError::UnknownMission {
                mission_id: *mission_id,
            });
        }
    }

    // Coverage: each batch mission exactly once across the two lists.
    let assigned_ids: HashSet<_> = proposal.assignments.iter().map(|a| a.mission_id).collect();
    let mut unassigned_ids = HashSet::new();
    for mission_id in &proposal.unassigned {
        if !unassigned_ids.insert(*mission_id) || assigned_ids.contains(mission_id) {
            return Err(AssignmentError::DuplicateMission {
                mission_id: *mission_id,
            });
        }
    }
    for mission in input.missions {
        if !assigned_ids.contains(&mission.mission_id)
            && !unassigned_ids.contains(&mission.mission_id)
        {
            return Err(AssignmentError::MissingMission {
                mission_id: mission.mission_id,
            });
        }
    }

    // Double-booking, within the proposal and against existing commitments.
    let mut per_agent: HashMap<_, Vec<&Mission>> = HashMap::new();
    for assignment in &proposal.assignments {
        per_agent
            .entry(assignment.agent_id)
            .or_default()
            .push(batch[&assignment.mission_id]);
    }
    for (agent_id, missions) in &per_agent {
        for (i, first) in missions.iter().enumerate() {
            if first.status_at(input.now) == MissionStatus::Completed {
                continue;
            }
            for second in &missions[i + 1..] {
                if second.status_at(input.now) != MissionStatus::Completed
                    && first.window.overlaps(&second.window)
                {
                    return Err(AssignmentError::DoubleBooked {
                        agent_id: *agent_id,
                        first: first.mission_id,
                        second: second.mission_id,
                    });
                }
            }
            let blocking =
                conflicting_missions(*agent_id, first, input.all_missions, input.now);
            if let Some(existing) = blocking.first() {
                return Err(AssignmentError::DoubleBooked {
                    agent_id: *agent_id,
                    first: first.mission_id,
                    second: existing.mission_id,
                });
            }
        }
    }

    Ok(())
}

/// Convenience check used by commit paths handed a single manual pair.
///
/// Defense in depth: the availability filter keeps conflicting choices out
/// of the UI, but a direct caller must still be flagged.
pub fn check_manual_assignment(
    agent: &Agent,
    candidate: &Mission,
    input: &EngineInput<'_>,
) -> Result<(), AssignmentError> {
    if !agent.has_skills(&candidate.required_skills) {
        return Err(AssignmentError::SkillMismatch {
            agent_id: agent.agent_id,
            mission_id: candidate.mission_id,
        });
    }
    let blocking = conflicting_missions(agent.agent_id, candidate, input.all_missions, input.now);
    if let Some(existing) = blocking.first() {
        return Err(AssignmentError::DoubleBooked {
            agent_id: agent.agent_id,
            first: candidate.mission_id,
            second: existing.mission_id,
        });
    }
    Ok(())
}
