//! `tavern session|campaign ...`, `tavern tables` and `tavern join`

use std::io::Write;

use tavern_core::lobby::{self, JoinOutcome, NewTable};
use tavern_core::{Error, GameTable, Result, RoomKind, TableStatus};

use crate::cli::Credentials;
use crate::state::{rng, AppState};

pub fn create(
    state: &AppState,
    settings: NewTable,
    credentials: &Credentials,
    out: &mut dyn Write,
) -> Result<()> {
    let gm = state.login(credentials)?;
    let table = lobby::open_table(&state.db, &gm, settings, &mut rng(None))?;

    writeln!(out, "Opened {} {}", table.kind, table.name)?;
    writeln!(out, "Room code: {} ({})", table.room_code, table.room_code.formatted())?;
    Ok(())
}

fn find(state: &AppState, kind: RoomKind, code: &str) -> Result<GameTable> {
    lobby::find_by_code(&state.db, code)?
        .filter(|table| table.kind == kind)
        .ok_or_else(|| Error::NotFound(format!("no {} with code {}", kind, code.trim())))
}

pub fn show(state: &AppState, kind: RoomKind, code: &str, out: &mut dyn Write) -> Result<()> {
    let table = find(state, kind, code)?;

    writeln!(out, "{} [{}] {}", table.room_code, table.status, table.name)?;
    if !table.game_system.is_empty() {
        writeln!(out, "System: {}", table.game_system)?;
    }
    if let Some(description) = &table.description {
        writeln!(out, "{}", description)?;
    }

    let seats = lobby::table_seats(&state.db, &table)?;
    writeln!(out, "Players {}/{}:", seats.len(), table.max_players)?;
    for seat in seats {
        writeln!(
            out,
            "  {}{}",
            seat.username,
            if seat.is_gm { " (GM)" } else { "" }
        )?;
    }
    Ok(())
}

pub fn set_status(
    state: &AppState,
    kind: RoomKind,
    code: &str,
    status: TableStatus,
    credentials: &Credentials,
    out: &mut dyn Write,
) -> Result<()> {
    let user = state.login(credentials)?;
    let table = find(state, kind, code)?;
    let table = lobby::set_status(&state.db, &user, &table, status)?;

    writeln!(out, "{} is now {}", table.name, table.status)?;
    Ok(())
}

pub fn list(
    state: &AppState,
    kind: Option<RoomKind>,
    username: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let tables = match username {
        Some(username) => {
            let user = state
                .db
                .users()
                .find_by_username(username)?
                .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))?;
            lobby::seated_tables(&state.db, user.id, kind)?
        }
        None => state.db.tables().list(kind)?,
    };
    if tables.is_empty() {
        writeln!(out, "No tables")?;
    }
    for table in tables {
        let seated = state.db.tables().count_members(table.id)?;
        writeln!(
            out,
            "{}  {:<8} {:<10} {}/{}  {}",
            table.room_code,
            table.kind,
            table.status,
            seated,
            table.max_players,
            table.name
        )?;
    }
    Ok(())
}

pub fn join(
    state: &AppState,
    code: &str,
    kind: RoomKind,
    credentials: &Credentials,
    out: &mut dyn Write,
) -> Result<()> {
    let user = state.login(credentials)?;

    match lobby::join_by_code(&state.db, &user, code, kind)? {
        JoinOutcome::Joined(table) => writeln!(out, "Joined {} {}", table.kind, table.name)?,
        JoinOutcome::AlreadySeated(table) => {
            writeln!(out, "Already seated at {} {}", table.kind, table.name)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn open(state: &AppState, kind: RoomKind, name: &str) -> String {
        let mut settings = NewTable::new(kind, name);
        settings.max_players = 2;
        let mut out = Vec::new();
        create(state, settings, &credentials("gm"), &mut out).unwrap();

        state
            .db
            .tables()
            .list(Some(kind))
            .unwrap()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
            .room_code
            .to_string()
    }

    #[test]
    fn test_create_and_join() {
        let state = state();
        register(&state, "gm");
        register(&state, "ayla");
        let code = open(&state, RoomKind::Campaign, "Saga");
        assert!(code.starts_with('C'));

        let mut out = Vec::new();
        join(&state, &code, RoomKind::Campaign, &credentials("ayla"), &mut out).unwrap();
        assert_eq!(output(out), "Joined campaign Saga\n");

        let mut out = Vec::new();
        join(&state, &code, RoomKind::Campaign, &credentials("ayla"), &mut out).unwrap();
        assert_eq!(output(out), "Already seated at campaign Saga\n");

        let mut out = Vec::new();
        show(&state, RoomKind::Campaign, &code, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Players 2/2:"));
        assert!(text.contains("gm (GM)"));
    }

    #[test]
    fn test_join_wrong_kind() {
        let state = state();
        register(&state, "gm");
        register(&state, "ayla");
        let code = open(&state, RoomKind::Session, "Night");

        assert!(matches!(
            join(&state, &code, RoomKind::Campaign, &credentials("ayla"), &mut Vec::new()),
            Err(Error::JoinRejected(_))
        ));
        assert!(matches!(
            show(&state, RoomKind::Campaign, &code, &mut Vec::new()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_status_then_join_ended() {
        let state = state();
        register(&state, "gm");
        register(&state, "ayla");
        let code = open(&state, RoomKind::Session, "Night");

        let end = |user: &str, out: &mut Vec<u8>| {
            set_status(
                &state,
                RoomKind::Session,
                &code,
                TableStatus::Ended,
                &credentials(user),
                out,
            )
        };

        assert!(matches!(
            end("ayla", &mut Vec::new()),
            Err(Error::InvalidOperation(_))
        ));

        let mut out = Vec::new();
        end("gm", &mut out).unwrap();
        assert_eq!(output(out), "Night is now ended\n");

        assert!(matches!(
            join(&state, &code, RoomKind::Session, &credentials("ayla"), &mut Vec::new()),
            Err(Error::JoinRejected(_))
        ));
    }

    #[test]
    fn test_list() {
        let state = state();
        register(&state, "gm");
        open(&state, RoomKind::Session, "Night");
        open(&state, RoomKind::Campaign, "Saga");

        let mut out = Vec::new();
        list(&state, Some(RoomKind::Session), None, &mut out).unwrap();
        let text = output(out);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Night"));

        let mut out = Vec::new();
        list(&state, None, None, &mut out).unwrap();
        assert_eq!(output(out).lines().count(), 2);
    }

    #[test]
    fn test_list_seated_user() {
        let state = state();
        register(&state, "gm");
        register(&state, "ayla");
        let night = open(&state, RoomKind::Session, "Night");
        open(&state, RoomKind::Campaign, "Saga");

        let mut out = Vec::new();
        list(&state, None, Some("ayla"), &mut out).unwrap();
        assert_eq!(output(out), "No tables\n");

        join(&state, &night, RoomKind::Session, &credentials("ayla"), &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        list(&state, None, Some("ayla"), &mut out).unwrap();
        let text = output(out);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Night"));

        let mut out = Vec::new();
        list(&state, None, Some("gm"), &mut out).unwrap();
        assert_eq!(output(out).lines().count(), 2);

        assert!(matches!(
            list(&state, None, Some("ghost"), &mut Vec::new()),
            Err(Error::NotFound(_))
        ));
    }
}
