//! Command handlers
//!
//! Each handler writes its human-readable output to `out` so it can be
//! captured in tests.

mod draws;
mod events;
mod tables;
mod tools;

use std::io::Write;

use tavern_core::{accounts, Error, GachaEvent, NewTable, Result, RoomKind};
use uuid::Uuid;

use crate::cli::{Command, TableCommand};
use crate::state::AppState;

/// Run one parsed command
pub fn run(state: &AppState, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Register { credentials } => {
            let user = accounts::register(&state.db, &credentials.user, &credentials.password)?;
            writeln!(out, "Registered {}", user.username)?;
            Ok(())
        }
        Command::Event(command) => events::run(state, command, out),
        Command::Draw {
            event,
            count,
            seed,
            credentials,
        } => draws::draw(state, &event, count, seed, &credentials, out),
        Command::History {
            event,
            user,
            by_rarity,
        } => draws::history(state, event.as_deref(), user.as_deref(), by_rarity, out),
        Command::Session(command) => table_command(state, RoomKind::Session, command, out),
        Command::Campaign(command) => table_command(state, RoomKind::Campaign, command, out),
        Command::Tables { kind, user } => {
            tables::list(state, kind.map(RoomKind::from), user.as_deref(), out)
        }
        Command::Join {
            code,
            kind,
            credentials,
        } => tables::join(state, &code, kind.into(), &credentials, out),
        Command::Code(_) | Command::Roll { .. } => run_offline(command, out),
    }
}

/// Run a command that needs no database
pub fn run_offline(command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Code(command) => tools::code(command, out),
        Command::Roll { notation, seed } => tools::roll(&notation, seed, out),
        _ => Err(Error::InvalidOperation(
            "command needs the database".into(),
        )),
    }
}

fn table_command(
    state: &AppState,
    kind: RoomKind,
    command: TableCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        TableCommand::Create {
            name,
            description,
            system,
            max_players,
            public,
            credentials,
        } => {
            let mut settings = NewTable::new(kind, name);
            settings.description = description;
            settings.game_system = system;
            settings.max_players = max_players;
            settings.is_public = public;
            tables::create(state, settings, &credentials, out)
        }
        TableCommand::Show { code } => tables::show(state, kind, &code, out),
        TableCommand::Status {
            code,
            status,
            credentials,
        } => tables::set_status(state, kind, &code, status.into(), &credentials, out),
    }
}

/// Find an event by ID, falling back to its name
fn resolve_event(state: &AppState, key: &str) -> Result<GachaEvent> {
    let by_id = match Uuid::parse_str(key.trim()) {
        Ok(id) => state.db.events().find_by_id(id)?,
        Err(_) => None,
    };

    match by_id {
        Some(event) => Ok(event),
        None => state
            .db
            .events()
            .find_by_name(key.trim())?
            .ok_or_else(|| Error::NotFound(format!("event '{}'", key))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tavern_core::{accounts, Card, GachaEvent, User};

    use crate::cli::Credentials;
    use crate::config::Config;
    use crate::state::AppState;

    pub fn state() -> AppState {
        AppState::in_memory(Config::default()).unwrap()
    }

    pub fn credentials(user: &str) -> Credentials {
        Credentials {
            user: user.to_string(),
            password: "hunter22".to_string(),
        }
    }

    pub fn register(state: &AppState, user: &str) -> User {
        accounts::register(&state.db, user, "hunter22").unwrap()
    }

    pub fn banner(state: &AppState) -> GachaEvent {
        let event = GachaEvent::new("Banner".to_string()).with_cards(vec![
            Card::new("Dragon", "SSR", 1.0).with_id("ssr"),
            Card::new("Slime", "N", 3.0).with_id("n"),
        ]);
        state.db.events().create(&event).unwrap();
        event
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_resolve_event_by_id_and_name() {
        let state = state();
        let event = banner(&state);

        assert_eq!(resolve_event(&state, "Banner").unwrap().id, event.id);
        assert_eq!(resolve_event(&state, &event.id.to_string()).unwrap().id, event.id);
        assert!(matches!(
            resolve_event(&state, "Nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_register_command() {
        let state = state();
        let mut out = Vec::new();

        run(
            &state,
            Command::Register {
                credentials: credentials("mira"),
            },
            &mut out,
        )
        .unwrap();

        assert_eq!(output(out), "Registered mira\n");
        assert!(state.db.users().find_by_username("mira").unwrap().is_some());
    }

    #[test]
    fn test_offline_commands() {
        let mut out = Vec::new();
        run_offline(
            Command::Roll {
                notation: "1d1+2".to_string(),
                seed: None,
            },
            &mut out,
        )
        .unwrap();
        assert_eq!(output(out), "1d1+2: [1] +2 = 3\n");

        assert!(matches!(
            run_offline(
                Command::Tables {
                    kind: None,
                    user: None,
                },
                &mut Vec::new()
            ),
            Err(Error::InvalidOperation(_))
        ));
    }
}
