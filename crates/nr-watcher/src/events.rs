//! Conversion from notify backend events to [`ChangeNotification`]s.
//!
//! # Event Flow
//!
//! ```text
//! notify::Event (kind + N paths)
//!        │
//!        ├── Rescan flag → WatchError::Overflow (events were lost)
//!        ├── Access(_)   → dropped (reads are not changes)
//!        │
//!        ▼
//!   ChangeKinds mapped once
//!        │
//!        ▼
//!   one ChangeNotification per UTF-8 path
//! ```

use camino::Utf8PathBuf;
use notify::EventKind;
use notify::event::ModifyKind;

use nr_core::{ChangeKind, ChangeKinds, ChangeNotification};

use crate::error::WatchError;

/// Maps a backend event kind to the change kinds it reports.
///
/// Returns `None` for access events, which are not changes. `Any` and
/// `Other` carry no recognisable operation and map to an empty set; the
/// filter treats those as accepted.
///
/// # Examples
///
/// ```
/// use notify::EventKind;
/// use notify::event::{CreateKind, MetadataKind, ModifyKind};
/// use nr_core::ChangeKind;
/// use nr_watcher::events::change_kinds;
///
/// let kinds = change_kinds(&EventKind::Create(CreateKind::File)).unwrap();
/// assert!(kinds.contains(ChangeKind::Create));
///
/// let kinds = change_kinds(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)))
///     .unwrap();
/// assert!(kinds.contains(ChangeKind::Chmod));
/// ```
#[must_use]
pub fn change_kinds(kind: &EventKind) -> Option<ChangeKinds> {
    let kinds = match kind {
        EventKind::Access(_) => return None,
        EventKind::Create(_) => ChangeKinds::single(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKinds::single(ChangeKind::Chmod),
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKinds::single(ChangeKind::Rename),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            ChangeKinds::single(ChangeKind::Write)
        }
        EventKind::Remove(_) => ChangeKinds::single(ChangeKind::Remove),
        EventKind::Any | EventKind::Other => ChangeKinds::new(),
    };
    Some(kinds)
}

/// Splits a backend event into one notification per reported path.
///
/// Paths that are not valid UTF-8 are logged and skipped. An event with no
/// paths has no subject to classify and yields nothing.
///
/// # Errors
///
/// Returns [`WatchError::Overflow`] for an event flagged as needing a
/// rescan: the backend has dropped events and can no longer be trusted.
pub fn notifications_from_event(
    event: notify::Event,
) -> Result<Vec<ChangeNotification>, WatchError> {
    if event.need_rescan() {
        return Err(WatchError::Overflow);
    }

    let Some(kinds) = change_kinds(&event.kind) else {
        tracing::trace!(kind = ?event.kind, paths = ?event.paths, "Dropping access event");
        return Ok(Vec::new());
    };

    if event.paths.is_empty() {
        tracing::trace!(kind = ?event.kind, "Dropping event without paths");
        return Ok(Vec::new());
    }

    Ok(event
        .paths
        .into_iter()
        .filter_map(|path| match Utf8PathBuf::try_from(path) {
            Ok(subject) => Some(ChangeNotification::new(subject, kinds.clone())),
            Err(e) => {
                let invalid_path = e.into_path_buf();
                tracing::warn!(
                    path = %invalid_path.display(),
                    "Skipping non-UTF-8 path in change notification"
                );
                None
            }
        })
        .collect())
}
