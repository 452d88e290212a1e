//! Opening and joining sessions and campaigns
//!
//! New tables get a room code that is unique against a snapshot of the
//! codes already stored. Two creations racing on the same snapshot can
//! still pick the same code; the store's UNIQUE constraint turns that into
//! an insert error for the loser.

use rand::Rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::invariants::{assert_seat_invariants, assert_table_invariants};
use crate::models::{GameTable, SeatInfo, TableMember, TableStatus, User};
use crate::room_code::{self, RoomKind};
use crate::storage::TableRepository;

/// Settings for a new table
#[derive(Debug, Clone)]
pub struct NewTable {
    pub kind: RoomKind,
    pub name: String,
    pub description: Option<String>,
    pub game_system: String,
    pub max_players: u32,
    pub is_public: bool,
}

impl NewTable {
    pub fn new(kind: RoomKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: None,
            game_system: String::new(),
            max_players: 6,
            is_public: false,
        }
    }
}

/// How a join request was satisfied
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// The user took a new seat
    Joined(GameTable),
    /// The user was already seated; nothing changed
    AlreadySeated(GameTable),
}

impl JoinOutcome {
    pub fn table(&self) -> &GameTable {
        match self {
            JoinOutcome::Joined(table) | JoinOutcome::AlreadySeated(table) => table,
        }
    }
}

/// Create a table with a fresh room code and seat `gm` as its GM
#[instrument(skip(storage, gm, rng), fields(kind = %settings.kind, name = %settings.name))]
pub fn open_table<S, R>(storage: &S, gm: &User, settings: NewTable, rng: &mut R) -> Result<GameTable>
where
    S: TableRepository + ?Sized,
    R: Rng + ?Sized,
{
    if settings.name.trim().is_empty() {
        return Err(Error::InvalidArgument("table name must not be empty".into()));
    }
    if settings.max_players == 0 {
        return Err(Error::InvalidArgument(
            "a table needs room for at least one player".into(),
        ));
    }

    let existing = storage.room_codes()?;
    let minted = room_code::generate_unique(settings.kind, &existing, rng);
    if minted.exhausted {
        warn!(code = %minted.code, "Room code may collide with an existing table");
    }

    let mut table = GameTable::new(settings.name.trim().to_string(), gm.id, minted.code)
        .with_game_system(settings.game_system)
        .with_max_players(settings.max_players)
        .public(settings.is_public);
    if let Some(description) = settings.description {
        table = table.with_description(description);
    }
    assert_table_invariants(&table);

    storage.create_table(&table)?;
    info!(code = %table.room_code, attempts = minted.attempts, "Table opened");

    Ok(table)
}

/// Join the table addressed by a user-typed room code.
///
/// The code must parse and be of `expected` kind. Joining a table the user
/// already sits at succeeds without changes.
#[instrument(skip(storage, user), fields(username = %user.username))]
pub fn join_by_code<S>(storage: &S, user: &User, input: &str, expected: RoomKind) -> Result<JoinOutcome>
where
    S: TableRepository + ?Sized,
{
    let code = input.trim();
    if code.is_empty() {
        return Err(Error::JoinRejected("no room code given".into()));
    }

    match room_code::parse(code) {
        Some(parsed) if parsed.kind == expected => {}
        Some(parsed) => {
            return Err(Error::JoinRejected(format!(
                "{} is a {} code, expected a {} code",
                code, parsed.kind, expected
            )))
        }
        None => return Err(Error::JoinRejected(format!("malformed room code '{}'", code))),
    }

    let table = storage
        .find_table_by_code(code)?
        .ok_or_else(|| Error::NotFound(format!("no {} with code {}", expected, code)))?;

    if storage.is_table_member(table.id, user.id)? {
        return Ok(JoinOutcome::AlreadySeated(table));
    }

    if table.status == TableStatus::Ended {
        return Err(Error::JoinRejected(format!("{} has ended", table.name)));
    }

    let seated = storage.count_table_members(table.id)?;
    if seated >= table.max_players {
        return Err(Error::JoinRejected(format!(
            "{} is full ({}/{})",
            table.name, seated, table.max_players
        )));
    }

    storage.add_table_member(&TableMember::new(table.id, user.id, false))?;
    info!(code = %table.room_code, "Player joined table");

    Ok(JoinOutcome::Joined(table))
}

/// Move a table to `status`. Only its GM may do this.
#[instrument(skip(storage, user, table), fields(code = %table.room_code))]
pub fn set_status<S>(storage: &S, user: &User, table: &GameTable, status: TableStatus) -> Result<GameTable>
where
    S: TableRepository + ?Sized,
{
    if table.gm_id != user.id {
        return Err(Error::InvalidOperation(format!(
            "only the GM can change the status of {}",
            table.name
        )));
    }
    if table.status == TableStatus::Ended && status != TableStatus::Ended {
        return Err(Error::InvalidOperation(format!("{} has already ended", table.name)));
    }

    storage.update_table_status(table.id, status)?;
    info!(from = %table.status, to = %status, "Table status changed");

    let mut updated = table.clone();
    updated.status = status;
    Ok(updated)
}

/// Look up a table by code regardless of kind
pub fn find_by_code<S>(storage: &S, input: &str) -> Result<Option<GameTable>>
where
    S: TableRepository + ?Sized,
{
    let code = input.trim();
    if room_code::parse(code).is_none() {
        return Ok(None);
    }
    storage.find_table_by_code(code)
}

/// Who sits at a table, GM first
pub fn table_seats<S>(storage: &S, table: &GameTable) -> Result<Vec<SeatInfo>>
where
    S: TableRepository + ?Sized,
{
    let seats = storage.list_table_members(table.id)?;
    assert_seat_invariants(&seats, table);
    Ok(seats)
}

/// Tables the user is seated at
pub fn seated_tables<S>(storage: &S, user_id: Uuid, kind: Option<RoomKind>) -> Result<Vec<GameTable>>
where
    S: TableRepository + ?Sized,
{
    let mut seated = Vec::new();
    for table in storage.list_tables(kind)? {
        if storage.is_table_member(table.id, user_id)? {
            seated.push(table);
        }
    }
    Ok(seated)
}
