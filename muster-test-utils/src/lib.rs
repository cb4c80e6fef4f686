//! MUSTER Test Utilities
//!
//! Centralized test infrastructure for the MUSTER workspace:
//! - Fixtures for agents and missions anchored to a fixed base time
//! - Proptest generators for intervals and mission batches

use chrono::{Duration, TimeZone, Utc};
use muster_core::{Agent, Interval, Mission, Timestamp};
use proptest::prelude::*;

/// Fixed anchor instant so tests are deterministic regardless of wall clock.
pub fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// `base_time()` plus a number of days.
pub fn day(offset: i64) -> Timestamp {
    base_time() + Duration::days(offset)
}

/// An agent fixture with a registration number derived from the first name.
pub fn sample_agent(first_name: &str, last_name: &str) -> Agent {
    Agent::new(
        first_name,
        last_name,
        format!("REG-{}", first_name.to_uppercase()),
        "Sergent",
    )
    .with_contact_number("0612345678")
    .with_address("1 Rue de la Paix, Paris")
}

/// A mission fixture spanning `[day(start_offset), day(end_offset)]`.
pub fn mission_spanning(name: &str, start_offset: i64, end_offset: i64) -> Mission {
    Mission::new(
        name,
        format!("{name} details"),
        Interval::new(day(start_offset), day(end_offset)).unwrap(),
    )
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Arbitrary valid interval within roughly three years of the base time.
pub fn arb_interval() -> impl Strategy<Value = Interval> {
    (0i64..1000, 1i64..200).prop_map(|(start_days, len_days)| {
        Interval::new(day(start_days), day(start_days + len_days)).unwrap()
    })
}

/// Arbitrary mission with an optional priority.
pub fn arb_mission() -> impl Strategy<Value = Mission> {
    (arb_interval(), proptest::option::of(0i32..10)).prop_map(|(window, priority)| {
        let mission = Mission::new("generated", "", window);
        match priority {
            Some(p) => mission.with_priority(p),
            None => mission,
        }
    })
}

/// A batch of up to `max` arbitrary missions.
pub fn arb_mission_batch(max: usize) -> impl Strategy<Value = Vec<Mission>> {
    proptest::collection::vec(arb_mission(), 1..=max)
}

/// A small roster of distinct agents.
pub fn arb_roster(max: usize) -> impl Strategy<Value = Vec<Agent>> {
    (1..=max).prop_map(|count| {
        (0..count)
            .map(|i| sample_agent(&format!("Agent{i}"), "Fixture"))
            .collect()
    })
}
