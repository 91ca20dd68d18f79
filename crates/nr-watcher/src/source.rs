//! Change notification source backed by the `notify` crate.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │              notify backend thread (inotify, ...)         │
//! │  ┌────────────────────┐  ┌──────────────────────────────┐ │
//! │  │ RecommendedWatcher │─►│ callback                     │ │
//! │  │                    │  │  Ok(event) → notifications   │ │
//! │  │                    │  │  Err(e)    → WatchError      │ │
//! │  └────────────────────┘  └───────┬──────────────┬───────┘ │
//! └──────────────────────────────────│──────────────│─────────┘
//!                              send  │              │ send
//!                                    ▼              ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                  │
//! │   UnboundedReceiver<ChangeNotification> → Batcher         │
//! │   UnboundedReceiver<WatchError>         → RunCoordinator  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Notifications and errors travel on separate channels: errors bypass
//! filtering entirely and end the session.

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use nr_core::ChangeNotification;

use crate::error::WatchError;
use crate::events::notifications_from_event;

/// Receiver for change notifications.
pub type NotificationStream = mpsc::UnboundedReceiver<ChangeNotification>;

/// Receiver for terminal backend errors.
pub type ErrorStream = mpsc::UnboundedReceiver<WatchError>;

/// A notify watcher plus the two channels it feeds.
///
/// # Lifecycle
///
/// 1. **Creation**: [`NotificationSource::new`] starts the backend.
/// 2. **Registration**: [`NotificationSource::watch`] adds each subject. Any
///    failure is returned immediately and dropping the source releases the
///    backend.
/// 3. **Streaming**: [`NotificationSource::into_parts`] hands out the
///    receivers and a [`WatchGuard`] that owns the backend for the rest of
///    the session.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use nr_watcher::NotificationSource;
///
/// # fn example() -> Result<(), nr_watcher::WatchError> {
/// let mut source = NotificationSource::new(false)?;
/// source.watch(Utf8Path::new("./src"))?;
/// let (_guard, mut notifications, mut errors) = source.into_parts();
/// # Ok(())
/// # }
/// ```
pub struct NotificationSource {
    watcher: RecommendedWatcher,
    mode: RecursiveMode,
    watched: Vec<Utf8PathBuf>,
    event_rx: NotificationStream,
    error_rx: ErrorStream,
}

impl std::fmt::Debug for NotificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSource")
            .field("mode", &self.mode)
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl NotificationSource {
    /// Starts the platform's recommended watch backend.
    ///
    /// Nothing is watched until [`watch`](Self::watch) is called.
    pub fn new(recursive: bool) -> Result<Self, WatchError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            dispatch(res, &event_tx, &error_tx);
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        Ok(Self {
            watcher,
            mode,
            watched: Vec::new(),
            event_rx,
            error_rx,
        })
    }

    /// Registers one watch subject.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist, or
    /// [`WatchError::Notify`] if the backend refuses it.
    pub fn watch(&mut self, path: &Utf8Path) -> Result<(), WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }
        self.watcher.watch(path.as_std_path(), self.mode)?;
        self.watched.push(path.to_owned());
        tracing::info!(path = %path, recursive = matches!(self.mode, RecursiveMode::Recursive), "Watching");
        Ok(())
    }

    /// Returns the registered subjects, in registration order.
    #[must_use]
    pub fn watched(&self) -> &[Utf8PathBuf] {
        &self.watched
    }

    /// Splits the source into its backend guard and its two streams.
    #[must_use]
    pub fn into_parts(self) -> (WatchGuard, NotificationStream, ErrorStream) {
        let guard = WatchGuard {
            watcher: self.watcher,
            watched: self.watched,
        };
        (guard, self.event_rx, self.error_rx)
    }
}

/// Routes one backend callback result to the notification or error channel.
fn dispatch(
    res: notify::Result<notify::Event>,
    event_tx: &mpsc::UnboundedSender<ChangeNotification>,
    error_tx: &mpsc::UnboundedSender<WatchError>,
) {
    let error = match res.map_err(WatchError::from).and_then(notifications_from_event) {
        Ok(notifications) => {
            for notification in notifications {
                if event_tx.send(notification).is_err() {
                    tracing::debug!("Notification channel closed, dropping event");
                    break;
                }
            }
            return;
        }
        Err(error) => error,
    };

    tracing::warn!(error = %error, "Watch backend error");
    let _ = error_tx.send(error);
}

/// Owns the watch backend for the lifetime of a session.
///
/// Dropping the guard unregisters every subject and stops the backend, after
/// which both streams report closed once drained.
pub struct WatchGuard {
    watcher: RecommendedWatcher,
    watched: Vec<Utf8PathBuf>,
}

impl std::fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchGuard")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl WatchGuard {
    /// Returns the watched subjects.
    #[must_use]
    pub fn watched(&self) -> &[Utf8PathBuf] {
        &self.watched
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        for path in &self.watched {
            if let Err(error) = self.watcher.unwatch(path.as_std_path()) {
                tracing::debug!(path = %path, error = %error, "Failed to unwatch path");
            }
        }
        tracing::info!(paths = self.watched.len(), "File watcher stopped");
    }
}
