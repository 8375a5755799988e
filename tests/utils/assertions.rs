//! Test assertion helpers
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashSet;

use lotto::{DrawStatus, Outcome};

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a control request was a reported no-op in the given state
pub fn assert_unchanged(outcome: Outcome, expected: DrawStatus) {
    assert_eq!(
        outcome,
        Outcome::Unchanged { status: expected },
        "request should have left the game {}",
        expected
    );
}

/// Assert every drawn number is unique and within 1..=max_number
pub fn assert_distinct_draws(log: &[u32], max_number: u32) {
    let unique: HashSet<u32> = log.iter().copied().collect();
    assert_eq!(unique.len(), log.len(), "a number was drawn twice: {:?}", log);
    assert!(
        log.iter().all(|n| (1..=max_number).contains(n)),
        "draw outside 1..={}: {:?}",
        max_number,
        log
    );
}
