//! Error types for the nr-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration errors.
//! Every variant is reported to the caller before a watch session starts.

use camino::Utf8PathBuf;

/// Errors that can occur while loading or validating a session configuration.
///
/// # Examples
///
/// ```
/// use nr_core::ConfigError;
///
/// let error = ConfigError::UnknownEventKind("TOUCH".to_owned());
/// assert!(error.to_string().contains("TOUCH"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No paths were given to watch.
    #[error("must specify files/directories to watch")]
    NoWatchPaths,

    /// The command string is empty or contains only whitespace.
    #[error("command to exec is empty")]
    EmptyCommand,

    /// The command string could not be split into arguments.
    #[error("failed to parse command '{command}': unbalanced quotes or trailing escape")]
    CommandParse {
        /// The command string as configured.
        command: String,
    },

    /// An ignored event kind is not one of the known labels.
    #[error("unknown event kind '{0}' (expected one of CREATE, WRITE, REMOVE, RENAME, CHMOD)")]
    UnknownEventKind(String),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingFile(Utf8PathBuf),

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
