//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for hosts (CLI, embedders).
//! - Normalize log level and directory inputs shared with `logging`.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - A configured log directory is always absolute.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "THREADNOTE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "THREADNOTE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "THREADNOTE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "threadnote.sqlite3";

/// Configuration rejected during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLogLevel(String),
    EmptyLogDir,
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyLogDir => write!(f, "log_dir cannot be empty"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{dir}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: &'static str,
    /// Absolute directory receiving rolling log files.
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    /// Builds a logging config from raw user input.
    pub fn new(level: &str, log_dir: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir)?,
        })
    }
}

/// Top-level configuration for a threadnote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the note store.
    pub db_path: PathBuf,
    /// `None` leaves file logging off.
    pub logging: Option<LoggingConfig>,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let logging = match non_blank(LOG_DIR_ENV) {
            Some(log_dir) => {
                let level = non_blank(LOG_LEVEL_ENV);
                Some(LoggingConfig::new(
                    level.as_deref().unwrap_or(default_log_level()),
                    &log_dir,
                )?)
            }
            None => None,
        };

        Ok(Self { db_path, logging })
    }
}

/// Default level for the current build mode: `debug` or `info`.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::UnsupportedLogLevel(other.to_string())),
    }
}

pub(crate) fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyLogDir);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(ConfigError::RelativeLogDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{
        default_log_level, normalize_level, normalize_log_dir, ConfigError, CoreConfig,
        DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn absolute_dir() -> PathBuf {
        std::env::temp_dir().join("threadnote-config-test")
    }

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(ConfigError::UnsupportedLogLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_and_blank_paths() {
        assert_eq!(
            normalize_log_dir("logs/dev"),
            Err(ConfigError::RelativeLogDir("logs/dev".to_string()))
        );
        assert_eq!(normalize_log_dir("  "), Err(ConfigError::EmptyLogDir));
    }

    #[test]
    fn empty_environment_uses_defaults_and_disables_logging() {
        let config = CoreConfig::from_lookup(lookup(&[(DB_PATH_ENV, "   ")])).unwrap();
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("threadnote.sqlite3")
        );
        assert!(config.logging.is_none());
    }

    #[test]
    fn log_dir_enables_logging_with_default_or_explicit_level() {
        let dir = absolute_dir();
        let dir_text = dir.to_str().unwrap();

        let defaulted = CoreConfig::from_lookup(lookup(&[(LOG_DIR_ENV, dir_text)])).unwrap();
        let logging = defaulted.logging.unwrap();
        assert_eq!(logging.level, default_log_level());
        assert_eq!(logging.log_dir, dir);

        let explicit = CoreConfig::from_lookup(lookup(&[
            (LOG_DIR_ENV, dir_text),
            (LOG_LEVEL_ENV, "ERROR"),
            (DB_PATH_ENV, "/data/notes.sqlite3"),
        ]))
        .unwrap();
        assert_eq!(explicit.logging.unwrap().level, "error");
        assert_eq!(explicit.db_path, PathBuf::from("/data/notes.sqlite3"));
    }

    #[test]
    fn invalid_logging_values_fail_resolution() {
        let err = CoreConfig::from_lookup(lookup(&[(LOG_DIR_ENV, "relative/logs")])).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
    }
}
