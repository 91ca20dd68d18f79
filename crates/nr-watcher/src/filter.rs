//! Notification classification.
//!
//! Every notification is classified exactly once, against immutable
//! [`IgnoreRules`], into one of three outcomes:
//!
//! 1. **Ignored by name** - the subject is an ignored subject. Checked first,
//!    so the kinds of such a notification never matter.
//! 2. **Ignored by kind** - every reported kind is ignored.
//! 3. **Accepted** - anything else, including a notification with no kinds.
//!
//! # Examples
//!
//! ```
//! use nr_core::{ChangeKind, ChangeNotification, IgnoreRules};
//! use nr_watcher::{Classification, EventFilter};
//!
//! let filter = EventFilter::new(IgnoreRules::new(["./src/gen.go"], [ChangeKind::Chmod]));
//!
//! let write = ChangeNotification::new("./src/a.go", ChangeKind::Write);
//! let chmod = ChangeNotification::new("./src/a.go", ChangeKind::Chmod);
//! let generated = ChangeNotification::new("./src/gen.go", ChangeKind::Write);
//!
//! assert_eq!(filter.classify(&write), Classification::Accepted);
//! assert_eq!(filter.classify(&chmod), Classification::IgnoredByKind);
//! assert_eq!(filter.classify(&generated), Classification::IgnoredByName);
//! ```

use std::fmt;

use nr_core::{ChangeNotification, IgnoreRules};

/// The outcome of classifying one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The subject is in the ignored-subjects set.
    IgnoredByName,
    /// Every reported kind is in the ignored-kinds set.
    IgnoredByKind,
    /// The notification should trigger a run.
    Accepted,
}

impl Classification {
    /// Returns `true` for [`Classification::Accepted`].
    #[inline]
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns the tally message prefix for this outcome.
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::IgnoredByName => "ignore event name",
            Self::IgnoredByKind => "ignore event kind",
            Self::Accepted => "accept event",
        }
    }

    /// Builds the tally message for `notification` under this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use nr_core::{ChangeKind, ChangeNotification};
    /// use nr_watcher::Classification;
    ///
    /// let n = ChangeNotification::new("./src/a.go", ChangeKind::Chmod);
    /// assert_eq!(
    ///     Classification::IgnoredByKind.message(&n),
    ///     r#"ignore event kind: "./src/a.go": CHMOD"#,
    /// );
    /// ```
    #[must_use]
    pub fn message(self, notification: &ChangeNotification) -> String {
        format!("{}: {notification}", self.prefix())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IgnoredByName => "ignored-by-name",
            Self::IgnoredByKind => "ignored-by-kind",
            Self::Accepted => "accepted",
        })
    }
}

/// Classifies notifications against a fixed set of [`IgnoreRules`].
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    rules: IgnoreRules,
}

impl EventFilter {
    /// Creates a filter over `rules`.
    #[must_use]
    pub fn new(rules: IgnoreRules) -> Self {
        Self { rules }
    }

    /// Classifies one notification. Has no side effects.
    #[must_use]
    pub fn classify(&self, notification: &ChangeNotification) -> Classification {
        if self.rules.ignores_subject(notification.subject()) {
            Classification::IgnoredByName
        } else if self.rules.ignores_all(&notification.kinds) {
            Classification::IgnoredByKind
        } else {
            Classification::Accepted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use nr_core::{ChangeKind, ChangeKinds};

    fn filter(subjects: &[&str], kinds: &[ChangeKind]) -> EventFilter {
        EventFilter::new(IgnoreRules::new(
            subjects.iter().copied(),
            kinds.iter().copied(),
        ))
    }

    #[test]
    fn test_ignored_subject_wins_for_any_kind() {
        let filter = filter(&["./src/gen.go"], &[]);
        for kind in ChangeKind::ALL {
            let n = ChangeNotification::new("./src/gen.go", kind);
            assert_eq!(filter.classify(&n), Classification::IgnoredByName);
        }
        let n = ChangeNotification::new("./src/gen.go", ChangeKinds::new());
        assert_eq!(filter.classify(&n), Classification::IgnoredByName);
    }

    #[test]
    fn test_all_kinds_ignored() {
        let filter = filter(&[], &[ChangeKind::Chmod, ChangeKind::Remove]);
        let kinds: ChangeKinds = [ChangeKind::Chmod, ChangeKind::Remove].into_iter().collect();
        let n = ChangeNotification::new("./src/a.go", kinds);
        assert_eq!(filter.classify(&n), Classification::IgnoredByKind);
    }

    #[test]
    fn test_one_unignored_kind_is_accepted() {
        let filter = filter(&[], &[ChangeKind::Chmod]);
        let kinds: ChangeKinds = [ChangeKind::Chmod, ChangeKind::Write].into_iter().collect();
        let n = ChangeNotification::new("./src/a.go", kinds);
        assert_eq!(filter.classify(&n), Classification::Accepted);
    }

    #[test]
    fn test_empty_kinds_are_accepted() {
        let filter = filter(&[], &ChangeKind::ALL);
        let n = ChangeNotification::new(Utf8PathBuf::from("./src"), ChangeKinds::new());
        assert!(filter.classify(&n).is_accepted());
    }

    #[test]
    fn test_messages() {
        let n = ChangeNotification::new("./src/a.go", ChangeKind::Write);
        insta::assert_snapshot!(Classification::Accepted.message(&n), @r#"accept event: "./src/a.go": WRITE"#);
        insta::assert_snapshot!(Classification::IgnoredByName.message(&n), @r#"ignore event name: "./src/a.go": WRITE"#);
    }
}
