//! Error types for the nr-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors raised while
//! registering watch subjects or delivered by the watch backend.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching.
///
/// Every variant is fatal to a watch session:
///
/// - **Notify errors** ([`WatchError::Notify`]): the backend is compromised
/// - **Path not found** ([`WatchError::PathNotFound`]): subject cannot be watched
/// - **Overflow** ([`WatchError::Overflow`]): the backend dropped events
///
/// # Examples
///
/// ```
/// use nr_watcher::WatchError;
///
/// let err = WatchError::path_not_found("./src");
/// assert_eq!(err.to_string(), "path does not exist: ./src");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The notify backend failed to start, to register a path, or while watching.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The path to watch does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The backend's event queue overflowed and changes were lost.
    #[error("watch backend event queue overflowed, changes were lost")]
    Overflow,
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }
}
