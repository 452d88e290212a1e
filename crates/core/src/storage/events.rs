//! Gacha event storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::{Error, Result};
use crate::invariants::assert_pool_invariants;
use crate::models::{Card, GachaEvent};

const EVENT_COLUMNS: &str =
    "id, name, description, is_public, max_participants, created_at, updated_at";

/// Event row without its cards
fn event_from_row(row: &Row<'_>) -> rusqlite::Result<GachaEvent> {
    Ok(GachaEvent {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_public: row.get::<_, i32>(3)? != 0,
        max_participants: row.get(4)?,
        cards: Vec::new(),
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

pub struct EventStore<'a> {
    conn: &'a Connection,
}

impl<'a> EventStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an event together with its cards
    #[instrument(skip(self, event), fields(event_name = %event.name, cards = event.cards.len()))]
    pub fn create(&self, event: &GachaEvent) -> Result<()> {
        assert_pool_invariants(&event.cards);
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO gacha_events (id, name, description, is_public, max_participants, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id.to_string(),
                event.name,
                event.description,
                event.is_public as i32,
                event.max_participants,
                event.created_at.to_rfc3339(),
                event.updated_at.to_rfc3339(),
            ],
        )?;
        insert_cards(&tx, event.id, &event.cards)?;

        tx.commit()?;
        Ok(())
    }

    /// Find event by ID, cards included
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<GachaEvent>> {
        let event = self
            .conn
            .query_row(
                &format!("SELECT {} FROM gacha_events WHERE id = ?1", EVENT_COLUMNS),
                params![id.to_string()],
                event_from_row,
            )
            .optional()?;

        match event {
            Some(mut event) => {
                event.cards = self.cards_for(event.id)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    /// Find the most recent event with the given name
    #[instrument(skip(self))]
    pub fn find_by_name(&self, name: &str) -> Result<Option<GachaEvent>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM gacha_events WHERE name = ?1 ORDER BY created_at DESC LIMIT 1",
                params![name],
                |row| parse_uuid(&row.get::<_, String>(0)?),
            )
            .optional()?;

        match id {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    /// List all events by name, cards included
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<GachaEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM gacha_events ORDER BY name",
            EVENT_COLUMNS
        ))?;

        let mut events = stmt
            .query_map([], event_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for event in &mut events {
            event.cards = self.cards_for(event.id)?;
        }

        Ok(events)
    }

    /// Cards of an event in pool order
    pub fn cards_for(&self, event_id: Uuid) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, rarity, weight, image, description
             FROM cards WHERE event_id = ?1 ORDER BY position",
        )?;

        let cards = stmt
            .query_map(params![event_id.to_string()], |row| {
                Ok(Card {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    rarity: row.get(2)?,
                    weight: row.get(3)?,
                    image: row.get(4)?,
                    description: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(cards)
    }

    /// Update event fields and replace its pool
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub fn update(&self, event: &GachaEvent) -> Result<()> {
        assert_pool_invariants(&event.cards);
        let tx = self.conn.unchecked_transaction()?;

        let changed = tx.execute(
            "UPDATE gacha_events SET name = ?1, description = ?2, is_public = ?3, max_participants = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                event.name,
                event.description,
                event.is_public as i32,
                event.max_participants,
                Utc::now().to_rfc3339(),
                event.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("event {}", event.id)));
        }

        tx.execute(
            "DELETE FROM cards WHERE event_id = ?1",
            params![event.id.to_string()],
        )?;
        insert_cards(&tx, event.id, &event.cards)?;

        tx.commit()?;
        Ok(())
    }

    /// Delete an event and its cards. Draw history is kept.
    #[instrument(skip(self))]
    pub fn delete(&self, event_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM gacha_events WHERE id = ?1",
            params![event_id.to_string()],
        )?;
        Ok(())
    }
}

fn insert_cards(conn: &Connection, event_id: Uuid, cards: &[Card]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO cards (event_id, id, position, name, rarity, weight, image, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;

    for (position, card) in cards.iter().enumerate() {
        stmt.execute(params![
            event_id.to_string(),
            card.id,
            position as i64,
            card.name,
            card.rarity,
            card.weight,
            card.image,
            card.description,
        ])?;
    }

    Ok(())
}
