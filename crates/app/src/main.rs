//! Tavern - tabletop session manager
//!
//! Command line front end: accounts, gacha events and draws, and
//! sessions/campaigns joined by room code.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod state;

use cli::{Cli, Command};
use config::Config;
use state::AppState;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging; RUST_LOG wins over the config
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli.command, config, cli.database.as_deref()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(
    command: Command,
    config: Config,
    database: Option<&std::path::Path>,
) -> tavern_core::Result<()> {
    // These need no database
    if matches!(command, Command::Code(_) | Command::Roll { .. }) {
        let mut stdout = std::io::stdout().lock();
        return commands::run_offline(command, &mut stdout);
    }

    let state = AppState::open(config, database)?;
    let mut stdout = std::io::stdout().lock();
    commands::run(&state, command, &mut stdout)
}
