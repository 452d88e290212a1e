//! SQLite storage layer for Tavern

mod events;
mod migrations;
mod parse;
mod records;
mod tables;
mod traits;
mod users;

use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{DrawRecord, GachaEvent, GameTable, SeatInfo, TableMember, TableStatus, User};
use crate::room_code::RoomKind;

pub use events::EventStore;
pub use records::{HistoryOrder, RecordFilter, RecordStore};
pub use tables::TableStore;
pub use traits::{EventRepository, RecordRepository, Storage, TableRepository, UserRepository};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get gacha event store
    pub fn events(&self) -> EventStore<'_> {
        EventStore::new(&self.conn)
    }

    /// Get draw record store
    pub fn records(&self) -> RecordStore<'_> {
        RecordStore::new(&self.conn)
    }

    /// Get session/campaign store
    pub fn tables(&self) -> TableStore<'_> {
        TableStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username)
    }

    fn update_last_login(&self, user_id: Uuid) -> Result<()> {
        self.users().update_last_login(user_id)
    }
}

impl EventRepository for Database {
    fn create_event(&self, event: &GachaEvent) -> Result<()> {
        self.events().create(event)
    }

    fn find_event_by_id(&self, id: Uuid) -> Result<Option<GachaEvent>> {
        self.events().find_by_id(id)
    }

    fn list_events(&self) -> Result<Vec<GachaEvent>> {
        self.events().list()
    }

    fn update_event(&self, event: &GachaEvent) -> Result<()> {
        self.events().update(event)
    }

    fn delete_event(&self, event_id: Uuid) -> Result<()> {
        self.events().delete(event_id)
    }
}

impl RecordRepository for Database {
    fn create_records(&self, records: &[DrawRecord]) -> Result<()> {
        self.records().create_many(records)
    }

    fn list_records(&self, filter: RecordFilter, order: HistoryOrder) -> Result<Vec<DrawRecord>> {
        self.records().list(filter, order)
    }

    fn delete_record(&self, record_id: Uuid) -> Result<()> {
        self.records().delete(record_id)
    }
}

impl TableRepository for Database {
    fn create_table(&self, table: &GameTable) -> Result<()> {
        self.tables().create(table)
    }

    fn find_table_by_code(&self, code: &str) -> Result<Option<GameTable>> {
        self.tables().find_by_room_code(code)
    }

    fn list_tables(&self, kind: Option<RoomKind>) -> Result<Vec<GameTable>> {
        self.tables().list(kind)
    }

    fn room_codes(&self) -> Result<HashSet<String>> {
        self.tables().room_codes()
    }

    fn update_table_status(&self, table_id: Uuid, status: TableStatus) -> Result<()> {
        self.tables().update_status(table_id, status)
    }

    fn add_table_member(&self, member: &TableMember) -> Result<()> {
        self.tables().add_member(member)
    }

    fn is_table_member(&self, table_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.tables().is_member(table_id, user_id)
    }

    fn count_table_members(&self, table_id: Uuid) -> Result<u32> {
        self.tables().count_members(table_id)
    }

    fn list_table_members(&self, table_id: Uuid) -> Result<Vec<SeatInfo>> {
        self.tables().list_members(table_id)
    }
}
