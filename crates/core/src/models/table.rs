//! Game table models - sessions and campaigns players join by room code

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::room_code::{RoomCode, RoomKind};

/// Lifecycle status of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Preparing,
    Active,
    Paused,
    Ended,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Preparing => "preparing",
            TableStatus::Active => "active",
            TableStatus::Paused => "paused",
            TableStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A game session or campaign.
///
/// The room code is fixed at creation; its prefix always matches `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTable {
    pub id: Uuid,
    pub kind: RoomKind,
    pub name: String,
    pub description: Option<String>,
    /// Game system label, e.g. "D&D 5e"
    pub game_system: String,
    pub gm_id: Uuid,
    pub max_players: u32,
    pub is_public: bool,
    pub room_code: RoomCode,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameTable {
    pub fn new(name: String, gm_id: Uuid, room_code: RoomCode) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: room_code.kind(),
            name,
            description: None,
            game_system: String::new(),
            gm_id,
            max_players: 6,
            is_public: false,
            room_code,
            status: TableStatus::Preparing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_game_system(mut self, game_system: String) -> Self {
        self.game_system = game_system;
        self
    }

    pub fn with_max_players(mut self, max_players: u32) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// A player seated at a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMember {
    pub table_id: Uuid,
    pub user_id: Uuid,
    pub is_gm: bool,
    pub joined_at: DateTime<Utc>,
}

impl TableMember {
    pub fn new(table_id: Uuid, user_id: Uuid, is_gm: bool) -> Self {
        Self {
            table_id,
            user_id,
            is_gm,
            joined_at: Utc::now(),
        }
    }
}

/// Member with display info, as listed for a table
#[derive(Debug, Clone)]
pub struct SeatInfo {
    pub user_id: Uuid,
    pub username: String,
    pub is_gm: bool,
    pub joined_at: DateTime<Utc>,
}
