//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future server backend).

use std::collections::HashSet;

use uuid::Uuid;

use super::{HistoryOrder, RecordFilter};
use crate::error::Result;
use crate::models::{DrawRecord, GachaEvent, GameTable, SeatInfo, TableMember, TableStatus, User};
use crate::room_code::RoomKind;

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find user by username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Update user's last login time
    fn update_last_login(&self, user_id: Uuid) -> Result<()>;
}

/// Gacha event repository operations
pub trait EventRepository {
    /// Create an event with its cards
    fn create_event(&self, event: &GachaEvent) -> Result<()>;

    /// Find event by ID
    fn find_event_by_id(&self, id: Uuid) -> Result<Option<GachaEvent>>;

    /// List all events
    fn list_events(&self) -> Result<Vec<GachaEvent>>;

    /// Update an event and replace its cards
    fn update_event(&self, event: &GachaEvent) -> Result<()>;

    /// Delete an event
    fn delete_event(&self, event_id: Uuid) -> Result<()>;
}

/// Draw history repository operations
pub trait RecordRepository {
    /// Persist a batch of draw records
    fn create_records(&self, records: &[DrawRecord]) -> Result<()>;

    /// List records
    fn list_records(&self, filter: RecordFilter, order: HistoryOrder) -> Result<Vec<DrawRecord>>;

    /// Delete a record
    fn delete_record(&self, record_id: Uuid) -> Result<()>;
}

/// Session and campaign repository operations
pub trait TableRepository {
    /// Create a table and seat its GM
    fn create_table(&self, table: &GameTable) -> Result<()>;

    /// Find a table by exact room code
    fn find_table_by_code(&self, code: &str) -> Result<Option<GameTable>>;

    /// List tables, optionally of one kind
    fn list_tables(&self, kind: Option<RoomKind>) -> Result<Vec<GameTable>>;

    /// Snapshot of every room code in use
    fn room_codes(&self) -> Result<HashSet<String>>;

    /// Change a table's lifecycle status
    fn update_table_status(&self, table_id: Uuid, status: TableStatus) -> Result<()>;

    /// Seat a player
    fn add_table_member(&self, member: &TableMember) -> Result<()>;

    /// Check whether a user is seated
    fn is_table_member(&self, table_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Count seated players
    fn count_table_members(&self, table_id: Uuid) -> Result<u32>;

    /// List seated players
    fn list_table_members(&self, table_id: Uuid) -> Result<Vec<SeatInfo>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite, mocks, or network.
pub trait Storage: UserRepository + EventRepository + RecordRepository + TableRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository + EventRepository + RecordRepository + TableRepository
{
}
