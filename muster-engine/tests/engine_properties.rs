//! Property suites for the overlap test and the greedy engine.
//!
//! Properties:
//! - the overlap test is symmetric,
//! - engine output covers every input mission exactly once,
//! - no agent ends up double-booked on overlapping missions,
//! - greedy output always passes proposal validation.

use muster_engine::{validate_proposal, AssignmentEngine, EngineInput, GreedyPriorityEngine};
use muster_test_utils::{arb_interval, arb_mission_batch, arb_roster, base_time};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn prop_overlap_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn prop_interval_never_overlaps_adjacent(iv in arb_interval()) {
        let after = iv.with_end(iv.end() + chrono::Duration::days(1)).unwrap();
        let adjacent = muster_core::Interval::new(iv.end(), after.end()).unwrap();
        prop_assert!(!iv.overlaps(&adjacent));
    }

    #[test]
    fn prop_engine_covers_every_mission_exactly_once(
        batch in arb_mission_batch(8),
        agents in arb_roster(4),
    ) {
        let input = EngineInput {
            missions: &batch,
            agents: &agents,
            all_missions: &batch,
            now: base_time(),
        };
        let proposal = GreedyPriorityEngine::new().propose(&input).unwrap();

        let assigned: HashSet<_> = proposal.assignments.iter().map(|a| a.mission_id).collect();
        let unassigned: HashSet<_> = proposal.unassigned.iter().copied().collect();

        prop_assert_eq!(unassigned.len(), proposal.unassigned.len());
        prop_assert!(assigned.is_disjoint(&unassigned));
        for mission in &batch {
            prop_assert!(
                assigned.contains(&mission.mission_id) ^ unassigned.contains(&mission.mission_id)
            );
        }
    }

    #[test]
    fn prop_engine_never_double_books(
        batch in arb_mission_batch(8),
        agents in arb_roster(4),
    ) {
        let input = EngineInput {
            missions: &batch,
            agents: &agents,
            all_missions: &batch,
            now: base_time(),
        };
        let proposal = GreedyPriorityEngine::new().propose(&input).unwrap();

        let window_of = |id| {
            batch
                .iter()
                .find(|m| m.mission_id == id)
                .map(|m| m.window)
                .unwrap()
        };
        for (i, first) in proposal.assignments.iter().enumerate() {
            for second in &proposal.assignments[i + 1..] {
                if first.agent_id == second.agent_id && first.mission_id != second.mission_id {
                    prop_assert!(
                        !window_of(first.mission_id).overlaps(&window_of(second.mission_id))
                    );
                }
            }
        }
    }

    #[test]
    fn prop_greedy_output_passes_validation(
        batch in arb_mission_batch(8),
        agents in arb_roster(4),
    ) {
        let input = EngineInput {
            missions: &batch,
            agents: &agents,
            all_missions: &batch,
            now: base_time(),
        };
        let proposal = GreedyPriorityEngine::new().propose(&input).unwrap();
        prop_assert!(validate_proposal(&proposal, &input).is_ok());
    }
}
