//! Conflict detection over an agent's existing commitments.
//!
//! A conflict is an agent being committed to two overlapping, non-Completed
//! missions. Completed missions never count as conflicts even if their
//! stored interval would overlap: once a mission's end has passed, the
//! agent is released. This is business policy, not an oversight.

use muster_core::{AgentId, Mission, MissionStatus, Timestamp};

/// Whether assigning `agent_id` to `candidate` would double-book the agent
/// against any other non-Completed mission in `all_missions`.
///
/// The candidate itself is skipped, so re-validating an existing assignment
/// does not report the mission as conflicting with itself.
pub fn has_conflict(
    agent_id: AgentId,
    candidate: &Mission,
    all_missions: &[Mission],
    now: Timestamp,
) -> bool {
    all_missions.iter().any(|m| {
        m.mission_id != candidate.mission_id
            && m.is_assigned_to(agent_id)
            && m.status_at(now) != MissionStatus::Completed
            && m.window.overlaps(&candidate.window)
    })
}

/// The missions that block `agent_id` from taking `candidate`.
///
/// Same predicate as [`has_conflict`], but returns every blocking mission so
/// callers can explain a disabled selection to the operator.
pub fn conflicting_missions<'a>(
    agent_id: AgentId,
    candidate: &Mission,
    all_missions: &'a [Mission],
    now: Timestamp,
) -> Vec<&'a Mission> {
    all_missions
        .iter()
        .filter(|m| {
            m.mission_id != candidate.mission_id
                && m.is_assigned_to(agent_id)
                && m.status_at(now) != MissionStatus::Completed
                && m.window.overlaps(&candidate.window)
        })
        .collect()
}
