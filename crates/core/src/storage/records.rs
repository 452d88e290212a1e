//! Draw record storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid};
use crate::error::Result;
use crate::models::{rarity_rank, DrawRecord};

/// Which records to list
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter {
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Ordering for history listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryOrder {
    /// Most recent first
    #[default]
    Newest,
    /// Rarest first, most recent first within a rarity
    Rarity,
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DrawRecord> {
    Ok(DrawRecord {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        event_id: parse_uuid(&row.get::<_, String>(1)?)?,
        event_name: row.get(2)?,
        card_id: row.get(3)?,
        card_name: row.get(4)?,
        card_rarity: row.get(5)?,
        user_id: parse_uuid(&row.get::<_, String>(6)?)?,
        username: row.get(7)?,
        drawn_at: parse_datetime(&row.get::<_, String>(8)?)?,
    })
}

pub struct RecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a batch of records atomically
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn create_many(&self, records: &[DrawRecord]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO draw_records (id, event_id, event_name, card_id, card_name, card_rarity, user_id, username, drawn_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.id.to_string(),
                    record.event_id.to_string(),
                    record.event_name,
                    record.card_id,
                    record.card_name,
                    record.card_rarity,
                    record.user_id.to_string(),
                    record.username,
                    record.drawn_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// List records matching `filter`
    #[instrument(skip(self))]
    pub fn list(&self, filter: RecordFilter, order: HistoryOrder) -> Result<Vec<DrawRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, event_name, card_id, card_name, card_rarity, user_id, username, drawn_at
             FROM draw_records
             WHERE (?1 IS NULL OR event_id = ?1) AND (?2 IS NULL OR user_id = ?2)
             ORDER BY drawn_at DESC, rowid DESC",
        )?;

        let mut records = stmt
            .query_map(
                params![
                    filter.event_id.map(|id| id.to_string()),
                    filter.user_id.map(|id| id.to_string()),
                ],
                record_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if order == HistoryOrder::Rarity {
            // Stable sort keeps newest-first inside each rarity
            records.sort_by(|a, b| rarity_rank(&b.card_rarity).cmp(&rarity_rank(&a.card_rarity)));
        }

        Ok(records)
    }

    /// Count records matching `filter`
    pub fn count(&self, filter: RecordFilter) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM draw_records
             WHERE (?1 IS NULL OR event_id = ?1) AND (?2 IS NULL OR user_id = ?2)",
            params![
                filter.event_id.map(|id| id.to_string()),
                filter.user_id.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete a single record
    pub fn delete(&self, record_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM draw_records WHERE id = ?1",
            params![record_id.to_string()],
        )?;
        Ok(())
    }
}
