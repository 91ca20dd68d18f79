//! Error types for the nr-runner crate.
//!
//! [`SessionError`] is the single terminal error a watch session can end
//! with. Recoverable conditions (a command that ran but failed) are logged
//! where they happen and never become a `SessionError`.

use nr_core::ConfigError;
use nr_watcher::WatchError;

/// The fatal condition that ended a watch session.
///
/// # Error Classes
///
/// - **Configuration** ([`SessionError::Config`], [`SessionError::Watch`] while
///   registering subjects): reported before the first run.
/// - **Filesystem** ([`SessionError::Watch`] from the error stream): ends a
///   running session.
/// - **Launch** ([`SessionError::Launch`]): the command cannot be started, so
///   every future trigger would fail the same way.
///
/// # Examples
///
/// ```
/// use nr_core::ConfigError;
/// use nr_runner::SessionError;
///
/// let err = SessionError::from(ConfigError::NoWatchPaths);
/// assert!(err.is_configuration());
/// assert_eq!(err.to_string(), "must specify files/directories to watch");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The watch backend failed, either registering a subject or while running.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The command could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        /// The program that failed to start.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The coordinator was run again after it had already terminated.
    #[error("watch session already terminated")]
    AlreadyTerminated,
}

impl SessionError {
    /// Returns `true` for errors detected before the watch loop starts.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Watch(WatchError::PathNotFound(_))
        )
    }

    /// Returns `true` if the session ended because the command could not start.
    #[must_use]
    pub const fn is_launch(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}
