//! Change notifications.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use super::kind::{ChangeKind, ChangeKinds};

/// One reported change to a watched filesystem entry.
///
/// Notifications are produced by the watch backend, classified once by the
/// event filter and then dropped; they are never stored.
///
/// The [`Display`](fmt::Display) form, `"<subject>": <KINDS>`, is what
/// appears in tally messages.
///
/// # Examples
///
/// ```
/// use nr_core::{ChangeKind, ChangeNotification};
///
/// let n = ChangeNotification::new("./src/a.go", ChangeKind::Write);
/// assert_eq!(n.to_string(), r#""./src/a.go": WRITE"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeNotification {
    /// Path of the changed entry, exactly as the backend reported it.
    pub subject: Utf8PathBuf,

    /// The operations reported for this entry.
    pub kinds: ChangeKinds,
}

impl ChangeNotification {
    /// Creates a notification for `subject` with the given kinds.
    #[must_use]
    pub fn new(subject: impl Into<Utf8PathBuf>, kinds: impl Into<ChangeKinds>) -> Self {
        Self {
            subject: subject.into(),
            kinds: kinds.into(),
        }
    }

    /// Returns the subject path.
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &Utf8Path {
        &self.subject
    }

    /// Returns `true` if the notification reports `kind`.
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: ChangeKind) -> bool {
        self.kinds.contains(kind)
    }
}

impl fmt::Display for ChangeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.subject, self.kinds)
    }
}
