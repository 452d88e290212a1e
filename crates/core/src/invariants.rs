//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Card, GameTable, SeatInfo};

/// Validate that a table's state is internally consistent
pub fn assert_table_invariants(table: &GameTable) {
    // The code prefix is the table's kind
    debug_assert!(
        table.room_code.kind() == table.kind,
        "Table {} is a {} but has code {}",
        table.id,
        table.kind,
        table.room_code
    );

    // Name must not be empty
    debug_assert!(
        !table.name.trim().is_empty(),
        "Table {} has empty name",
        table.id
    );

    debug_assert!(
        table.gm_id != Uuid::nil(),
        "Table {} has nil gm_id",
        table.id
    );
}

/// Validate that a seat list is consistent with its table
pub fn assert_seat_invariants(seats: &[SeatInfo], table: &GameTable) {
    // Exactly one GM, and it is the table's GM
    let gms: Vec<_> = seats.iter().filter(|s| s.is_gm).collect();
    debug_assert!(
        seats.is_empty() || (gms.len() == 1 && gms[0].user_id == table.gm_id),
        "Table {} has GM seats {:?}, expected only {}",
        table.id,
        gms.iter().map(|s| s.user_id).collect::<Vec<_>>(),
        table.gm_id
    );

    debug_assert!(
        seats.len() <= table.max_players as usize,
        "Table {} seats {} of {} players",
        table.id,
        seats.len(),
        table.max_players
    );
}

/// Validate that card IDs within a pool are unique
pub fn assert_pool_invariants(cards: &[Card]) {
    let mut seen = HashSet::new();
    for card in cards {
        debug_assert!(
            seen.insert(card.id.as_str()),
            "Pool has duplicate card id {}",
            card.id
        );
    }
}
