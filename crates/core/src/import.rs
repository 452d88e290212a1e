//! Bulk pool import and export
//!
//! CSV files carry one card per row under a `name,rarity,probability,image,description`
//! header. Every column is optional. JSON pool files hold an event's name,
//! description and cards.

use std::collections::HashSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::{Card, GachaEvent, DEFAULT_RARITY};

/// Column order of CSV pool files
pub const CSV_HEADER: [&str; 5] = ["name", "rarity", "probability", "image", "description"];

/// Weight given to rows without a `probability` value
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Default, Deserialize)]
struct CardRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    probability: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CardRow {
    /// `row` is the 1-based data row, header excluded
    fn into_card(self, row: usize) -> Result<Card> {
        let weight = match non_empty(self.probability) {
            None => DEFAULT_WEIGHT,
            Some(raw) => {
                let weight: f64 = raw.trim().parse().map_err(|_| {
                    Error::Import(format!("row {}: probability '{}' is not a number", row, raw))
                })?;
                if !weight.is_finite() || weight < 0.0 {
                    return Err(Error::Import(format!(
                        "row {}: probability {} must be a finite number >= 0",
                        row, weight
                    )));
                }
                weight
            }
        };

        let name = non_empty(self.name).unwrap_or_else(|| format!("Card {}", row));
        let rarity = non_empty(self.rarity).unwrap_or_else(|| DEFAULT_RARITY.to_string());

        let mut card = Card::new(name, rarity, weight);
        card.image = non_empty(self.image);
        card.description = non_empty(self.description);
        Ok(card)
    }
}

/// Read cards from CSV. Fails on the first bad row, naming it.
#[instrument(skip(reader))]
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Card>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut cards = Vec::new();
    for (index, row) in csv_reader.deserialize::<CardRow>().enumerate() {
        let row_number = index + 1;
        let row = row.map_err(|e| Error::Import(format!("row {}: {}", row_number, e)))?;
        cards.push(row.into_card(row_number)?);
    }

    debug!(count = cards.len(), "Read cards from CSV");
    Ok(cards)
}

/// Write cards as CSV with a header row
pub fn write_csv<W: Write>(writer: W, cards: &[Card]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for card in cards {
        csv_writer.write_record([
            card.name.as_str(),
            card.rarity.as_str(),
            card.weight.to_string().as_str(),
            card.image.as_deref().unwrap_or(""),
            card.description.as_deref().unwrap_or(""),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Sample cards for a new CSV pool file
pub fn template_cards() -> Vec<Card> {
    vec![
        Card::new("SSR Hero", "SSR", 0.01).with_description("Ultra rare character"),
        Card::new("SR Hero", "SR", 0.05).with_description("Rare character"),
        Card::new("R Hero", "R", 0.2).with_description("Uncommon character"),
        Card::new("N Hero", "N", 0.74).with_description("Common character"),
    ]
}

/// Write the header and sample rows
pub fn write_template<W: Write>(writer: W) -> Result<()> {
    write_csv(writer, &template_cards())
}

/// Portable form of an event's pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cards: Vec<Card>,
}

impl PoolFile {
    pub fn from_event(event: &GachaEvent) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            cards: event.cards.clone(),
        }
    }

    /// Build a new event from this pool. The event gets a fresh ID.
    pub fn into_event(self) -> GachaEvent {
        let mut event = GachaEvent::new(self.name).with_cards(self.cards);
        event.description = self.description;
        event
    }
}

/// Write an event's pool as pretty JSON
pub fn export_pool<W: Write>(writer: W, event: &GachaEvent) -> Result<()> {
    serde_json::to_writer_pretty(writer, &PoolFile::from_event(event))?;
    Ok(())
}

/// Read a JSON pool file, rejecting duplicate card IDs and negative or
/// non-finite weights
#[instrument(skip(reader))]
pub fn import_pool<R: Read>(reader: R) -> Result<PoolFile> {
    let pool: PoolFile = serde_json::from_reader(reader)?;

    if pool.name.trim().is_empty() {
        return Err(Error::Import("pool file has no name".into()));
    }
    let mut seen = HashSet::new();
    for (index, card) in pool.cards.iter().enumerate() {
        if !seen.insert(card.id.as_str()) {
            return Err(Error::Import(format!(
                "card {} ('{}'): duplicate id",
                index + 1,
                card.id
            )));
        }
        if !card.weight.is_finite() || card.weight < 0.0 {
            return Err(Error::Import(format!(
                "card {} ('{}'): probability {} must be a finite number >= 0",
                index + 1,
                card.id,
                card.weight
            )));
        }
    }

    Ok(pool)
}
