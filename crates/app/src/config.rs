//! `tavern.toml` configuration

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tavern_core::{Error, Result};
use tracing::debug;

pub const CONFIG_FILE: &str = "tavern.toml";
pub const DATABASE_FILE: &str = "tavern.db";

/// User-tunable settings. Every field has a default, so an empty or
/// missing file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; the platform data dir is used when unset
    pub database_path: Option<PathBuf>,
    /// Largest batch a single draw may ask for
    pub max_draw_count: usize,
    /// Batch size when `draw` is given no count
    pub default_draw_count: usize,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            max_draw_count: 100,
            default_draw_count: 1,
            log_filter: "info".to_string(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "onyx", "tavern").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ))
    })
}

impl Config {
    /// Load from `explicit`, or from the platform config dir if a file is there.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = project_dirs()?.config_dir().join(CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse(&text)
            .map_err(|e| Error::InvalidArgument(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_draw_count == 0 {
            return Err(Error::InvalidArgument(
                "max_draw_count must be at least 1".into(),
            ));
        }
        if self.default_draw_count == 0 || self.default_draw_count > self.max_draw_count {
            return Err(Error::InvalidArgument(format!(
                "default_draw_count must be between 1 and {}",
                self.max_draw_count
            )));
        }
        Ok(())
    }

    /// Database location: `override_path`, then the config, then the data dir
    pub fn database_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path.or(self.database_path.as_deref()) {
            return Ok(path.to_path_buf());
        }
        Ok(project_dirs()?.data_dir().join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("max_draw_count = 10\nlog_filter = \"debug\"\n").unwrap();
        assert_eq!(config.max_draw_count, 10);
        assert_eq!(config.default_draw_count, 1);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_rejects_bad_counts() {
        assert!(Config::parse("max_draw_count = 0").is_err());
        assert!(Config::parse("max_draw_count = 5\ndefault_draw_count = 6").is_err());
        assert!(Config::parse("max_draw_count = \"lots\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "database_path = \"/tmp/elsewhere.db\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config.database_path(None).unwrap(),
            PathBuf::from("/tmp/elsewhere.db")
        );

        let cli_db = dir.path().join("cli.db");
        assert_eq!(config.database_path(Some(&cli_db)).unwrap(), cli_db);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::load(Some(&dir.path().join("absent.toml"))),
            Err(Error::Io(_))
        ));
    }
}
