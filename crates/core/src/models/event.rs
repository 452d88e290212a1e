//! Gacha event model - a named, stored draw pool

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Card;

/// A gacha event players draw from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GachaEvent {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cards: Vec<Card>,
    pub is_public: bool,
    pub max_participants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GachaEvent {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            cards: Vec::new(),
            is_public: true,
            max_participants: 10,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }
}
