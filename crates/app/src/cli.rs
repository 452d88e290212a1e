//! Command line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tavern_core::{RoomKind, TableStatus};

#[derive(Debug, Parser)]
#[command(name = "tavern")]
#[command(about = "Tabletop session manager with gacha draws", version)]
pub struct Cli {
    /// Config file (defaults to tavern.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Username and password of the acting user
#[derive(Debug, Clone, Args)]
pub struct Credentials {
    #[arg(long, short)]
    pub user: String,

    #[arg(long, env = "TAVERN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Manage gacha events
    #[command(subcommand)]
    Event(EventCommand),

    /// Draw cards from an event
    Draw {
        /// Event name or ID
        event: String,

        /// Number of cards (defaults to the config's default_draw_count)
        #[arg(long, short, allow_negative_numbers = true)]
        count: Option<i64>,

        /// RNG seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show draw history
    History {
        /// Only this event (name or ID)
        #[arg(long)]
        event: Option<String>,

        /// Only this user
        #[arg(long)]
        user: Option<String>,

        /// Rarest first instead of newest first
        #[arg(long)]
        by_rarity: bool,
    },

    /// Manage sessions
    #[command(subcommand)]
    Session(TableCommand),

    /// Manage campaigns
    #[command(subcommand)]
    Campaign(TableCommand),

    /// List sessions and campaigns
    Tables {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Only tables this user is seated at
        #[arg(long)]
        user: Option<String>,
    },

    /// Join a session or campaign by room code
    Join {
        code: String,

        /// Kind of table the code is expected to address
        #[arg(long = "as", value_enum, default_value_t = KindArg::Session)]
        kind: KindArg,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Room code utilities
    #[command(subcommand)]
    Code(CodeCommand),

    /// Roll dice, e.g. 2d6+3
    Roll {
        notation: String,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Create an event, optionally with cards from a CSV file
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        csv: Option<PathBuf>,

        #[arg(long)]
        private: bool,

        #[arg(long, default_value_t = 10)]
        max_participants: u32,
    },

    /// Create an event from a JSON pool file
    Import { path: PathBuf },

    /// Write an event's pool as JSON
    Export {
        event: String,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// List events
    List,

    /// Show an event's cards and odds
    Show { event: String },

    /// Write a sample CSV pool
    Template {
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Delete an event (draw history is kept)
    Delete { event: String },
}

#[derive(Debug, Subcommand)]
pub enum TableCommand {
    /// Open a new table with yourself as GM
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value = "")]
        system: String,

        #[arg(long, default_value_t = 6)]
        max_players: u32,

        #[arg(long)]
        public: bool,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show a table and who sits at it
    Show { code: String },

    /// Change a table's status (GM only)
    Status {
        code: String,

        #[arg(value_enum)]
        status: StatusArg,

        #[command(flatten)]
        credentials: Credentials,
    },
}

#[derive(Debug, Subcommand)]
pub enum CodeCommand {
    /// Check a room code and show its kind
    Parse { code: String },

    /// Generate a code without storing anything
    Generate {
        #[arg(long, value_enum, default_value_t = KindArg::Session)]
        kind: KindArg,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Session,
    Campaign,
}

impl From<KindArg> for RoomKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Session => RoomKind::Session,
            KindArg::Campaign => RoomKind::Campaign,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Preparing,
    Active,
    Paused,
    Ended,
}

impl From<StatusArg> for TableStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Preparing => TableStatus::Preparing,
            StatusArg::Active => TableStatus::Active,
            StatusArg::Paused => TableStatus::Paused,
            StatusArg::Ended => TableStatus::Ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_draw() {
        let cli = Cli::try_parse_from([
            "tavern", "draw", "Summer", "--count", "10", "--seed", "7", "--user", "mira",
            "--password", "hunter22",
        ])
        .unwrap();

        match cli.command {
            Command::Draw {
                event,
                count,
                seed,
                credentials,
            } => {
                assert_eq!(event, "Summer");
                assert_eq!(count, Some(10));
                assert_eq!(seed, Some(7));
                assert_eq!(credentials.user, "mira");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_join_kind() {
        let cli = Cli::try_parse_from([
            "tavern", "join", "C123456", "--as", "campaign", "-u", "mira", "--password", "pw1234",
        ])
        .unwrap();

        match cli.command {
            Command::Join { code, kind, .. } => {
                assert_eq!(code, "C123456");
                assert_eq!(RoomKind::from(kind), RoomKind::Campaign);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
