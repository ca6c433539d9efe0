//! Config file loading and creation for the tourney CLI.
//!
//! Config lives at $XDG_CONFIG_HOME/tourney/config.toml (default ~/.config).
//! All fields are optional; CLI args override config values.

use std::env;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct TourneyConfig {
    /// Session file used when --session is not given.
    pub session: Option<PathBuf>,
    /// Save after every change. Defaults to true when a session file is known.
    pub autosave: Option<bool>,
    /// Prefix exported items with their rank.
    pub numbers: Option<bool>,
    /// Fixed RNG seed for reproducible shuffles.
    pub seed: Option<u64>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# tourney configuration
# All values here can be overridden by CLI flags.

# Session file to save to and resume from
# session = \"/home/me/rankings/movies.json\"

# Save after every choice, undo, rename or deletion
# autosave = true

# Prefix exported items with their rank (\"1. Item\")
# numbers = true

# Seed for the shuffle, for reproducible pairings
# seed = 42
";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,

    #[error("config file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write config to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn config_dir_from(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    match xdg.filter(|dir| !dir.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home.map(|home| PathBuf::from(home).join(".config")),
    }
}

/// `$XDG_CONFIG_HOME/tourney/config.toml`, else `~/.config/tourney/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = config_dir_from(env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME"))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("tourney").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<TourneyConfig, toml::de::Error> {
    toml::from_str(content)
}

/// A missing file is an empty config.
pub fn load_config(path: &Path) -> Result<TourneyConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TourneyConfig::default()),
        Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
    };
    parse_config(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Write the commented template to `path`, never replacing an existing file.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        Err(e) => return Err(write_err(e)),
    };
    file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        assert_eq!(parse_config(DEFAULT_CONFIG_TEMPLATE).unwrap(), TourneyConfig::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let cfg = parse_config(
            "session = \"/tmp/s.json\"\nautosave = false\nnumbers = true\nseed = 9\n",
        )
        .unwrap();
        assert_eq!(cfg.session, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(cfg.autosave, Some(false));
        assert_eq!(cfg.numbers, Some(true));
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(parse_config("seed = \"nine\"").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("config.toml")).unwrap(), TourneyConfig::default());
    }

    #[test]
    fn test_bad_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "autosave = \"sometimes\"").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_create_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tourney").join("config.toml");

        create_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), TourneyConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TEMPLATE);

        std::fs::write(&path, "seed = 3\n").unwrap();
        assert!(matches!(create_default_config(&path), Err(ConfigError::AlreadyExists(_))));
        assert_eq!(load_config(&path).unwrap().seed, Some(3));
    }

    #[test]
    fn test_config_dir_prefers_xdg() {
        let xdg = Some(OsString::from("/xdg"));
        let home = Some(OsString::from("/home/me"));
        assert_eq!(config_dir_from(xdg, home.clone()), Some(PathBuf::from("/xdg")));
        assert_eq!(config_dir_from(Some(OsString::new()), home.clone()), Some(PathBuf::from("/home/me/.config")));
        assert_eq!(config_dir_from(None, home), Some(PathBuf::from("/home/me/.config")));
        assert_eq!(config_dir_from(None, None), None);
    }
}
