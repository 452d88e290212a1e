//! Draw record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Card, GachaEvent, User};

/// One drawn card, as remembered in a user's history.
///
/// Card name and rarity are copied at draw time so history survives
/// later edits to the event's pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_name: String,
    pub card_id: String,
    pub card_name: String,
    pub card_rarity: String,
    pub user_id: Uuid,
    pub username: String,
    pub drawn_at: DateTime<Utc>,
}

impl DrawRecord {
    pub fn new(event: &GachaEvent, card: &Card, user: &User, drawn_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: event.id,
            event_name: event.name.clone(),
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            card_rarity: card.rarity.clone(),
            user_id: user.id,
            username: user.username.clone(),
            drawn_at,
        }
    }
}
