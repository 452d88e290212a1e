//! Session and campaign storage operations

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    parse_datetime, parse_room_code, parse_room_kind, parse_uuid, status_from_str, OptionalExt,
};
use crate::error::Result;
use crate::models::{GameTable, SeatInfo, TableMember, TableStatus};
use crate::room_code::RoomKind;

const TABLE_COLUMNS: &str = "id, kind, name, description, game_system, gm_id, max_players, is_public, room_code, status, created_at, updated_at";

fn table_from_row(row: &Row<'_>) -> rusqlite::Result<GameTable> {
    Ok(GameTable {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        kind: parse_room_kind(&row.get::<_, String>(1)?)?,
        name: row.get(2)?,
        description: row.get(3)?,
        game_system: row.get(4)?,
        gm_id: parse_uuid(&row.get::<_, String>(5)?)?,
        max_players: row.get(6)?,
        is_public: row.get::<_, i32>(7)? != 0,
        room_code: parse_room_code(&row.get::<_, String>(8)?)?,
        status: status_from_str(&row.get::<_, String>(9)?),
        created_at: parse_datetime(&row.get::<_, String>(10)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(11)?)?,
    })
}

pub struct TableStore<'a> {
    conn: &'a Connection,
}

impl<'a> TableStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a table and seat its GM
    #[instrument(skip(self, table), fields(table_name = %table.name, room_code = %table.room_code))]
    pub fn create(&self, table: &GameTable) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO game_tables ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                TABLE_COLUMNS
            ),
            params![
                table.id.to_string(),
                table.kind.as_str(),
                table.name,
                table.description,
                table.game_system,
                table.gm_id.to_string(),
                table.max_players,
                table.is_public as i32,
                table.room_code.as_str(),
                table.status.as_str(),
                table.created_at.to_rfc3339(),
                table.updated_at.to_rfc3339(),
            ],
        )?;

        let gm = TableMember::new(table.id, table.gm_id, true);
        tx.execute(
            "INSERT INTO table_members (table_id, user_id, is_gm, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                gm.table_id.to_string(),
                gm.user_id.to_string(),
                gm.is_gm as i32,
                gm.joined_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Find table by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<GameTable>> {
        let table = self
            .conn
            .query_row(
                &format!("SELECT {} FROM game_tables WHERE id = ?1", TABLE_COLUMNS),
                params![id.to_string()],
                table_from_row,
            )
            .optional()?;

        Ok(table)
    }

    /// Find table by exact room code
    #[instrument(skip(self))]
    pub fn find_by_room_code(&self, code: &str) -> Result<Option<GameTable>> {
        let table = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM game_tables WHERE room_code = ?1",
                    TABLE_COLUMNS
                ),
                params![code],
                table_from_row,
            )
            .optional()?;

        Ok(table)
    }

    /// List tables, optionally of one kind, newest first
    #[instrument(skip(self))]
    pub fn list(&self, kind: Option<RoomKind>) -> Result<Vec<GameTable>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM game_tables WHERE (?1 IS NULL OR kind = ?1) ORDER BY created_at DESC",
            TABLE_COLUMNS
        ))?;

        let tables = stmt
            .query_map(params![kind.map(|k| k.as_str())], table_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tables)
    }

    /// Every room code currently in use, across both kinds
    pub fn room_codes(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT room_code FROM game_tables")?;

        let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;

        Ok(codes)
    }

    /// Update table status
    #[instrument(skip(self))]
    pub fn update_status(&self, table_id: Uuid, status: TableStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE game_tables SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), table_id.to_string()],
        )?;
        Ok(())
    }

    /// Seat a player
    #[instrument(skip(self, member), fields(table_id = %member.table_id, user_id = %member.user_id))]
    pub fn add_member(&self, member: &TableMember) -> Result<()> {
        self.conn.execute(
            "INSERT INTO table_members (table_id, user_id, is_gm, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                member.table_id.to_string(),
                member.user_id.to_string(),
                member.is_gm as i32,
                member.joined_at.to_rfc3339(),
            ],
        )?;
        self.conn.execute(
            "UPDATE game_tables SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), member.table_id.to_string()],
        )?;
        Ok(())
    }

    /// Check whether a user is seated at a table
    pub fn is_member(&self, table_id: Uuid, user_id: Uuid) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM table_members WHERE table_id = ?1 AND user_id = ?2",
                params![table_id.to_string(), user_id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Number of seated players, GM included
    pub fn count_members(&self, table_id: Uuid) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM table_members WHERE table_id = ?1",
            params![table_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Seated players with usernames, GM first
    pub fn list_members(&self, table_id: Uuid) -> Result<Vec<SeatInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.user_id, u.username, m.is_gm, m.joined_at
             FROM table_members m
             INNER JOIN users u ON u.id = m.user_id
             WHERE m.table_id = ?1
             ORDER BY m.is_gm DESC, m.joined_at",
        )?;

        let seats = stmt
            .query_map(params![table_id.to_string()], |row| {
                Ok(SeatInfo {
                    user_id: parse_uuid(&row.get::<_, String>(0)?)?,
                    username: row.get(1)?,
                    is_gm: row.get::<_, i32>(2)? != 0,
                    joined_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(seats)
    }

    /// Delete a table and its seats
    #[instrument(skip(self))]
    pub fn delete(&self, table_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM game_tables WHERE id = ?1",
            params![table_id.to_string()],
        )?;
        Ok(())
    }
}
