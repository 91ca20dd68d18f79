//! Change kinds.
//!
//! A filesystem backend may report several elementary operations in one
//! notification (a file created and written before the event was read, for
//! instance), so a notification carries a [`ChangeKinds`] set rather than a
//! single [`ChangeKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ConfigError;

/// One elementary change operation.
///
/// Each kind has a canonical upper-case label used on the command line
/// (`--ignore-event CHMOD`) and in log output.
///
/// # Examples
///
/// ```
/// use nr_core::ChangeKind;
///
/// assert_eq!(ChangeKind::Chmod.label(), "CHMOD");
/// assert_eq!("write".parse::<ChangeKind>().ok(), Some(ChangeKind::Write));
/// assert!("touch".parse::<ChangeKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A new entry appeared.
    Create,
    /// The entry's contents changed.
    Write,
    /// The entry was deleted.
    Remove,
    /// The entry was renamed or moved.
    Rename,
    /// The entry's metadata (permissions, timestamps) changed.
    Chmod,
}

impl ChangeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Write,
        Self::Remove,
        Self::Rename,
        Self::Chmod,
    ];

    /// Returns the canonical upper-case label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Chmod => "CHMOD",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChangeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownEventKind(trimmed.to_owned()))
    }
}

/// A small, deduplicated set of [`ChangeKind`]s.
///
/// Kinds are kept in declaration order so the rendered form is stable:
/// `CREATE|WRITE` regardless of the order the backend reported them in.
///
/// # Examples
///
/// ```
/// use nr_core::{ChangeKind, ChangeKinds};
///
/// let kinds: ChangeKinds = [ChangeKind::Write, ChangeKind::Create, ChangeKind::Write]
///     .into_iter()
///     .collect();
/// assert_eq!(kinds.len(), 2);
/// assert_eq!(kinds.to_string(), "CREATE|WRITE");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ChangeKinds(SmallVec<[ChangeKind; 4]>);

impl ChangeKinds {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Creates a set holding exactly one kind.
    #[inline]
    #[must_use]
    pub fn single(kind: ChangeKind) -> Self {
        let mut kinds = Self::new();
        kinds.insert(kind);
        kinds
    }

    /// Adds a kind. Returns `false` if it was already present.
    pub fn insert(&mut self, kind: ChangeKind) -> bool {
        match self.0.binary_search(&kind) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, kind);
                true
            }
        }
    }

    /// Returns `true` if the set contains `kind`.
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: ChangeKind) -> bool {
        self.0.binary_search(&kind).is_ok()
    }

    /// Returns the number of kinds in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the kinds in declaration order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = ChangeKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ChangeKind> for ChangeKinds {
    fn from_iter<I: IntoIterator<Item = ChangeKind>>(iter: I) -> Self {
        let mut kinds = Self::new();
        for kind in iter {
            kinds.insert(kind);
        }
        kinds
    }
}

impl From<ChangeKind> for ChangeKinds {
    fn from(kind: ChangeKind) -> Self {
        Self::single(kind)
    }
}

impl fmt::Display for ChangeKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(kind.label())?;
        }
        Ok(())
    }
}
