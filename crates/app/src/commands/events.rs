//! `tavern event ...`

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tavern_core::gacha::pool_odds;
use tavern_core::import;
use tavern_core::{GachaEvent, Result};
use tracing::info;

use super::resolve_event;
use crate::cli::EventCommand;
use crate::state::AppState;

pub fn run(state: &AppState, command: EventCommand, out: &mut dyn Write) -> Result<()> {
    match command {
        EventCommand::Create {
            name,
            description,
            csv,
            private,
            max_participants,
        } => {
            let cards = match csv {
                Some(path) => import::read_csv(BufReader::new(File::open(&path)?))?,
                None => Vec::new(),
            };

            let mut event = GachaEvent::new(name).with_cards(cards);
            event.description = description;
            event.is_public = !private;
            event.max_participants = max_participants;
            state.db.events().create(&event)?;

            writeln!(out, "Created event {} ({} cards)", event.name, event.cards.len())?;
            writeln!(out, "id: {}", event.id)?;
            Ok(())
        }
        EventCommand::Import { path } => {
            let pool = import::import_pool(BufReader::new(File::open(&path)?))?;
            let event = pool.into_event();
            state.db.events().create(&event)?;
            info!(event = %event.name, path = %path.display(), "Imported pool");

            writeln!(out, "Imported event {} ({} cards)", event.name, event.cards.len())?;
            writeln!(out, "id: {}", event.id)?;
            Ok(())
        }
        EventCommand::Export { event, out: path } => {
            let event = resolve_event(state, &event)?;
            match path {
                Some(path) => {
                    let mut file = create_file(&path)?;
                    import::export_pool(&mut file, &event)?;
                    file.flush()?;
                    writeln!(out, "Exported {} to {}", event.name, path.display())?;
                }
                None => {
                    import::export_pool(&mut *out, &event)?;
                    writeln!(out)?;
                }
            }
            Ok(())
        }
        EventCommand::List => {
            let events = state.db.events().list()?;
            if events.is_empty() {
                writeln!(out, "No events")?;
            }
            for event in events {
                writeln!(
                    out,
                    "{}  {:<24} {:>3} cards{}",
                    event.id,
                    event.name,
                    event.cards.len(),
                    if event.is_public { "" } else { "  (private)" }
                )?;
            }
            Ok(())
        }
        EventCommand::Show { event } => {
            let event = resolve_event(state, &event)?;
            writeln!(out, "{}", event.name)?;
            if let Some(description) = &event.description {
                writeln!(out, "{}", description)?;
            }
            for odds in pool_odds(&event.cards) {
                writeln!(
                    out,
                    "  [{:>4}] {:<24} {:>7.3}%",
                    odds.card.rarity,
                    odds.card.name,
                    odds.percent()
                )?;
            }
            Ok(())
        }
        EventCommand::Template { out: path } => {
            match path {
                Some(path) => {
                    let mut file = create_file(&path)?;
                    import::write_template(&mut file)?;
                    file.flush()?;
                    writeln!(out, "Wrote template to {}", path.display())?;
                }
                None => import::write_template(&mut *out)?,
            }
            Ok(())
        }
        EventCommand::Delete { event } => {
            let event = resolve_event(state, &event)?;
            state.db.events().delete(event.id)?;
            writeln!(out, "Deleted event {}", event.name)?;
            Ok(())
        }
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
