//! Draw from a stored event and record the results

use chrono::Utc;
use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{draw_many, RarityTally};
use crate::error::{Error, Result};
use crate::models::{DrawRecord, User};
use crate::storage::{EventRepository, RecordRepository};

/// Records created by one pull, in draw order
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub records: Vec<DrawRecord>,
    pub tally: RarityTally,
}

/// Draw `count` cards from an event for `user` and persist one record per card.
///
/// `count` must be within `1..=max_count`.
#[instrument(skip(storage, user, rng), fields(username = %user.username))]
pub fn draw_for_user<S, R>(
    storage: &S,
    event_id: Uuid,
    user: &User,
    count: usize,
    max_count: usize,
    rng: &mut R,
) -> Result<DrawOutcome>
where
    S: EventRepository + RecordRepository + ?Sized,
    R: Rng + ?Sized,
{
    if count == 0 || count > max_count {
        return Err(Error::InvalidArgument(format!(
            "draw count must be between 1 and {}, got {}",
            max_count, count
        )));
    }

    let event = storage
        .find_event_by_id(event_id)?
        .ok_or_else(|| Error::NotFound(format!("event {}", event_id)))?;

    let drawn = draw_many(&event.cards, count, rng)?;

    let drawn_at = Utc::now();
    let records: Vec<DrawRecord> = drawn
        .iter()
        .map(|card| DrawRecord::new(&event, card, user, drawn_at))
        .collect();
    storage.create_records(&records)?;

    let tally = RarityTally::from_cards(drawn.iter().copied());
    info!(event = %event.name, count, "Draw recorded");

    Ok(DrawOutcome { records, tally })
}
