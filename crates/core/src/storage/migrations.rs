//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login TEXT
            );

            -- Gacha events (named draw pools)
            CREATE TABLE IF NOT EXISTS gacha_events (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                is_public INTEGER NOT NULL DEFAULT 1,
                max_participants INTEGER NOT NULL DEFAULT 10,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Cards of each event, in pool order
            CREATE TABLE IF NOT EXISTS cards (
                event_id TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                rarity TEXT NOT NULL,
                weight REAL NOT NULL,
                image TEXT,
                description TEXT,
                PRIMARY KEY (event_id, id),
                FOREIGN KEY (event_id) REFERENCES gacha_events(id) ON DELETE CASCADE
            );

            -- Draw history; card and event fields are copies so history
            -- outlives pool edits and event deletion
            CREATE TABLE IF NOT EXISTS draw_records (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL,
                event_name TEXT NOT NULL,
                card_id TEXT NOT NULL,
                card_name TEXT NOT NULL,
                card_rarity TEXT NOT NULL,
                user_id TEXT NOT NULL,
                username TEXT NOT NULL,
                drawn_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Sessions and campaigns
            CREATE TABLE IF NOT EXISTS game_tables (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                game_system TEXT NOT NULL DEFAULT '',
                gm_id TEXT NOT NULL,
                max_players INTEGER NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                room_code TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'preparing',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (gm_id) REFERENCES users(id)
            );

            -- Players seated at a table
            CREATE TABLE IF NOT EXISTS table_members (
                table_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                is_gm INTEGER NOT NULL DEFAULT 0,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (table_id, user_id),
                FOREIGN KEY (table_id) REFERENCES game_tables(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Card indexes
            CREATE INDEX IF NOT EXISTS idx_cards_event_position ON cards(event_id, position);

            -- Draw record indexes
            CREATE INDEX IF NOT EXISTS idx_draw_records_event ON draw_records(event_id);
            CREATE INDEX IF NOT EXISTS idx_draw_records_user ON draw_records(user_id);
            CREATE INDEX IF NOT EXISTS idx_draw_records_drawn ON draw_records(drawn_at);

            -- Table indexes
            CREATE INDEX IF NOT EXISTS idx_game_tables_kind ON game_tables(kind);
            CREATE INDEX IF NOT EXISTS idx_table_members_user ON table_members(user_id);
        "#,
    },
];

fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;
    Ok(())
}

/// Highest applied version, 0 for a fresh database
fn current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Apply one migration and record it, atomically
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        params![
            migration.version,
            migration.description,
            Utc::now().to_rfc3339()
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Bring the schema up to the latest version
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let from = current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        apply(conn, migration)?;
    }

    info!(from, to = current_version(conn)?, "Database schema updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latest_version() -> u32 {
        MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn test_migrations_run() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), latest_version());

        let tables = table_names(&conn);
        for expected in [
            "cards",
            "draw_records",
            "gacha_events",
            "game_tables",
            "schema_migrations",
            "table_members",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, latest_version());
    }

    #[test]
    fn test_migrations_sequential() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(
                migration.version as usize,
                i + 1,
                "Migration {} should have version {}",
                migration.description,
                i + 1
            );
        }
    }

    #[test]
    fn test_resumes_from_partial_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_migrations_table(&conn).unwrap();
        apply(&conn, &MIGRATIONS[0]).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);

        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }
}
