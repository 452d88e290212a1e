//! Application state management

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tavern_core::{accounts, Database, Result, User};
use tracing::info;

use crate::cli::Credentials;
use crate::config::Config;

/// Everything a command needs, passed by reference
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

impl AppState {
    /// Open the configured database, creating its directory if needed
    pub fn open(config: Config, database: Option<&Path>) -> Result<Self> {
        let db_path = config.database_path(database)?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;
        info!(path = %db_path.display(), "Database ready");

        Ok(Self { db, config })
    }

    #[cfg(test)]
    pub fn in_memory(config: Config) -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
            config,
        })
    }

    /// Log in with the given credentials
    pub fn login(&self, credentials: &Credentials) -> Result<User> {
        accounts::login(&self.db, &credentials.user, &credentials.password)
    }
}

/// Seeded RNG when a seed is given, otherwise one seeded from the OS
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tavern.db");

        let state = AppState::open(Config::default(), Some(&path)).unwrap();
        assert!(path.exists());
        assert!(state.db.schema_version() > 0);
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let a: Vec<u32> = (0..5).map(|_| rng(Some(9)).gen()).collect();
        let b: u32 = rng(Some(9)).gen();
        assert!(a.iter().all(|v| *v == b));
    }
}
