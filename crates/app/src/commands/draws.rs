//! `tavern draw` and `tavern history`

use std::io::Write;

use tavern_core::gacha::{self, RarityTally};
use tavern_core::{Error, HistoryOrder, RecordFilter, Result};

use super::resolve_event;
use crate::cli::Credentials;
use crate::state::{rng, AppState};

pub fn draw(
    state: &AppState,
    event: &str,
    count: Option<i64>,
    seed: Option<u64>,
    credentials: &Credentials,
    out: &mut dyn Write,
) -> Result<()> {
    let user = state.login(credentials)?;
    let event = resolve_event(state, event)?;
    let count = match count {
        Some(count) => gacha::draw_count(count)?,
        None => state.config.default_draw_count,
    };

    let mut rng = rng(seed);
    let outcome = gacha::draw_for_user(
        &state.db,
        event.id,
        &user,
        count,
        state.config.max_draw_count,
        &mut rng,
    )?;

    writeln!(out, "{} drew {} from {}:", user.username, count, event.name)?;
    for record in &outcome.records {
        writeln!(out, "  [{:>4}] {}", record.card_rarity, record.card_name)?;
    }
    write_tally(out, &outcome.tally)?;
    Ok(())
}

pub fn history(
    state: &AppState,
    event: Option<&str>,
    username: Option<&str>,
    by_rarity: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut filter = RecordFilter::default();
    if let Some(event) = event {
        filter.event_id = Some(resolve_event(state, event)?.id);
    }
    if let Some(username) = username {
        let user = state
            .db
            .users()
            .find_by_username(username)?
            .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))?;
        filter.user_id = Some(user.id);
    }

    let order = if by_rarity {
        HistoryOrder::Rarity
    } else {
        HistoryOrder::Newest
    };
    let records = state.db.records().list(filter, order)?;

    if records.is_empty() {
        writeln!(out, "No draws yet")?;
        return Ok(());
    }
    for record in &records {
        writeln!(
            out,
            "{}  {:<12} {:<16} [{:>4}] {}",
            record.drawn_at.format("%Y-%m-%d %H:%M:%S"),
            record.username,
            record.event_name,
            record.card_rarity,
            record.card_name
        )?;
    }
    write_tally(out, &RarityTally::from_records(&records))?;
    Ok(())
}

fn write_tally(out: &mut dyn Write, tally: &RarityTally) -> Result<()> {
    let parts: Vec<String> = tally
        .entries()
        .into_iter()
        .map(|(rarity, count)| format!("{} x{}", rarity, count))
        .collect();
    writeln!(out, "Total {}: {}", tally.total(), parts.join(", "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_draw_and_history() {
        let state = state();
        register(&state, "mira");
        banner(&state);

        let mut out = Vec::new();
        draw(&state, "Banner", Some(8), Some(3), &credentials("mira"), &mut out).unwrap();
        let text = output(out);
        assert!(text.starts_with("mira drew 8 from Banner:"));
        assert!(text.contains("Total 8:"));

        let mut out = Vec::new();
        history(&state, Some("Banner"), Some("mira"), true, &mut out).unwrap();
        let text = output(out);
        assert_eq!(text.lines().count(), 9);

        let first_rarity = if text.contains("[ SSR]") { "[ SSR]" } else { "[   N]" };
        assert!(text.lines().next().unwrap().contains(first_rarity));
    }

    #[test]
    fn test_same_seed_same_cards() {
        let state = state();
        register(&state, "mira");
        banner(&state);

        let mut first = Vec::new();
        let mut second = Vec::new();
        draw(&state, "Banner", Some(20), Some(11), &credentials("mira"), &mut first).unwrap();
        draw(&state, "Banner", Some(20), Some(11), &credentials("mira"), &mut second).unwrap();
        assert_eq!(output(first), output(second));
    }

    #[test]
    fn test_default_count_and_limits() {
        let state = state();
        register(&state, "mira");
        banner(&state);

        let mut out = Vec::new();
        draw(&state, "Banner", None, Some(1), &credentials("mira"), &mut out).unwrap();
        assert!(output(out).starts_with("mira drew 1 from Banner:"));

        for bad in [-1, 0, 101] {
            assert!(matches!(
                draw(&state, "Banner", Some(bad), None, &credentials("mira"), &mut Vec::new()),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_draw_requires_login() {
        let state = state();
        register(&state, "mira");
        banner(&state);

        let mut wrong = credentials("mira");
        wrong.password = "nope-nope".to_string();
        assert!(matches!(
            draw(&state, "Banner", Some(1), None, &wrong, &mut Vec::new()),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_empty_history() {
        let state = state();
        let mut out = Vec::new();
        history(&state, None, None, false, &mut out).unwrap();
        assert_eq!(output(out), "No draws yet\n");
    }
}
