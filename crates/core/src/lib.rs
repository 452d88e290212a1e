//! Tavern Core Library
//!
//! Core models, weighted gacha draws, room codes, and storage for the Tavern
//! tabletop session manager.

pub mod accounts;
pub mod dice;
pub mod error;
pub mod gacha;
pub mod import;
pub mod invariants;
pub mod lobby;
pub mod models;
pub mod room_code;
pub mod storage;

pub use dice::{DiceExpr, DiceRoll};
pub use error::{Error, Result};
pub use gacha::{draw_for_user, draw_many, draw_one, DrawOutcome, RarityTally};
pub use lobby::{JoinOutcome, NewTable};
pub use models::*;
pub use room_code::{MintedCode, ParsedRoomCode, RoomCode, RoomKind};
pub use storage::{
    Database, EventRepository, HistoryOrder, RecordFilter, RecordRepository, Storage,
    TableRepository, UserRepository,
};
