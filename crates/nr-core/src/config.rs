//! Configuration for a watch session.
//!
//! A [`SessionConfig`] is assembled once at start-up, from command-line flags
//! and optionally a JSON file, and is never mutated after the session starts.
//!
//! All fields implement [`Default`] so a JSON file only needs the keys it
//! wants to change.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default period between tally flushes, in milliseconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5_000;

/// Configuration for one watch session.
///
/// # Examples
///
/// ```
/// use nr_core::SessionConfig;
///
/// let config = SessionConfig::default();
/// assert_eq!(config.flush_interval_ms, 5_000);
/// assert!(!config.recursive);
///
/// // An empty configuration has nothing to watch and nothing to run.
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Files and directories to watch.
    pub watch_paths: Vec<Utf8PathBuf>,

    /// Shell-style command string run on every trigger.
    pub command: String,

    /// Exact subjects whose notifications never trigger a run.
    pub ignore_paths: Vec<Utf8PathBuf>,

    /// Change kind labels (`CHMOD`, `WRITE`, ...) to ignore.
    ///
    /// A notification is ignored only when every one of its kinds is listed.
    pub ignore_events: Vec<String>,

    /// Period between tally flushes, in milliseconds.
    pub flush_interval_ms: u64,

    /// Whether to watch directories recursively.
    pub recursive: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watch_paths: Vec::new(),
            command: String::new(),
            ignore_paths: Vec::new(),
            ignore_events: Vec::new(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            recursive: false,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration watching `paths` and running `command`.
    #[must_use]
    pub fn new<P>(paths: impl IntoIterator<Item = P>, command: impl Into<String>) -> Self
    where
        P: Into<Utf8PathBuf>,
    {
        Self {
            watch_paths: paths.into_iter().map(Into::into).collect(),
            command: command.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Missing keys take their default values.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_owned()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Returns the flush period as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Checks the invariants a session needs before it starts.
    ///
    /// The command string is only checked for emptiness here; tokenizing it
    /// is the runner's job.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_paths.is_empty() {
            return Err(ConfigError::NoWatchPaths);
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::InvalidOption {
                option: "flush_interval_ms".to_owned(),
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert!(config.watch_paths.is_empty());
        assert!(config.command.is_empty());
        assert_eq!(config.flush_interval(), Duration::from_secs(5));
        assert!(!config.recursive);
    }

    #[test]
    fn test_validate_rejects_empty_watch_list() {
        let config = SessionConfig::new(Vec::<Utf8PathBuf>::new(), "make build");
        assert!(matches!(config.validate(), Err(ConfigError::NoWatchPaths)));
    }

    #[test]
    fn test_validate_rejects_blank_command() {
        let config = SessionConfig::new(["./src"], "   ");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyCommand)));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = SessionConfig::new(["./src"], "make build");
        config.flush_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { ref option, .. }) if option == "flush_interval_ms"
        ));
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        let config = SessionConfig::new(["./src"], "make build");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{"watch_paths": ["./src"], "ignore_events": ["CHMOD"]}"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.watch_paths, vec![Utf8PathBuf::from("./src")]);
        assert_eq!(config.ignore_events, vec!["CHMOD".to_owned()]);
        assert_eq!(config.flush_interval_ms, DEFAULT_FLUSH_INTERVAL_MS);
        assert!(config.command.is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("notifyrun.json")).unwrap();
        std::fs::write(
            &path,
            r#"{"watch_paths": ["a", "b"], "command": "make build", "recursive": true}"#,
        )
        .unwrap();

        let config = SessionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.watch_paths.len(), 2);
        assert_eq!(config.command, "make build");
        assert!(config.recursive);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = SessionConfig::from_json_file(Utf8Path::new("/nonexistent/notifyrun.json"));
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_from_json_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("bad.json")).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SessionConfig::from_json_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
