//! Weighted card draws
//!
//! Selection is proportional to each card's relative weight and uses
//! cumulative-sum inversion: draw `r` uniformly from `[0, total)` and take
//! the first card whose running total exceeds `r`. Draws never touch the
//! pool, so concurrent callers need no coordination.

mod pull;
mod stats;

use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Card;

pub use pull::{draw_for_user, DrawOutcome};
pub use stats::{pool_odds, CardOdds, RarityTally};

/// Validate a pool and return the sum of its weights.
///
/// Runs before any randomness is consumed.
pub fn total_weight(pool: &[Card]) -> Result<f64> {
    if pool.is_empty() {
        return Err(Error::EmptyPool);
    }

    let mut total = 0.0;
    for card in pool {
        if !card.weight.is_finite() || card.weight < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "card '{}' has invalid weight {}",
                card.id, card.weight
            )));
        }
        total += card.weight;
    }

    if total <= 0.0 || !total.is_finite() {
        return Err(Error::InvalidArgument(
            "pool needs at least one card with positive weight".into(),
        ));
    }

    Ok(total)
}

/// Pick the card at position `r` on the cumulative weight line.
///
/// `r` is expected in `[0, total)`. If float error walks past the end,
/// the last card with positive weight is returned. Returns `None` only when
/// no card has positive weight.
pub fn pick(pool: &[Card], r: f64) -> Option<&Card> {
    let mut cumulative = 0.0;
    for card in pool {
        cumulative += card.weight;
        if r < cumulative {
            return Some(card);
        }
    }

    let fallback = pool.iter().rev().find(|card| card.weight > 0.0);
    if let Some(card) = fallback {
        debug!(r, cumulative, card_id = %card.id, "Cumulative walk overran, using last weighted card");
    }
    fallback
}

/// Draw one card
pub fn draw_one<'a, R: Rng + ?Sized>(pool: &'a [Card], rng: &mut R) -> Result<&'a Card> {
    let total = total_weight(pool)?;
    let r = rng.gen_range(0.0..total);
    pick(pool, r).ok_or(Error::EmptyPool)
}

/// Draw `count` cards independently, with replacement, in draw order
pub fn draw_many<'a, R: Rng + ?Sized>(
    pool: &'a [Card],
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a Card>> {
    let total = total_weight(pool)?;

    (0..count)
        .map(|_| {
            let r = rng.gen_range(0.0..total);
            pick(pool, r).ok_or(Error::EmptyPool)
        })
        .collect()
}

/// Convert a caller-supplied draw count, rejecting negatives
pub fn draw_count(count: i64) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| Error::InvalidArgument(format!("draw count must not be negative, got {}", count)))
}
