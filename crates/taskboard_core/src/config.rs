//! Runtime configuration from environment variables.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Resolution never touches the filesystem.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "TASKBOARD_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TASKBOARD_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TASKBOARD_LOG_DIR";

const DEFAULT_DB_FILE: &str = "taskboard.sqlite3";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(value) => write!(
                f,
                "{LOG_LEVEL_VAR}=`{value}` is not one of trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(value) => {
                write!(f, "{LOG_DIR_VAR} must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl BoardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE));

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(value) => {
                let lowered = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&lowered.as_str()) {
                    return Err(ConfigError::InvalidLogLevel(value));
                }
                lowered
            }
            None => default_log_level().to_string(),
        };

        let log_dir = match read(LOG_DIR_VAR) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(value));
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
