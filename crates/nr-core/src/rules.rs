//! Ignore rules.
//!
//! [`IgnoreRules`] holds the two sets consulted for every notification: exact
//! subjects to ignore, and change kinds to ignore. Both are fixed when the
//! rules are built and only read afterwards.
//!
//! Subjects are compared as strings, not as path components: `./src//a.go`
//! and `./src/a.go/` do not match `./src/a.go`.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::hash::{FxHashSet, fx_hash_set};
use crate::types::{ChangeKind, ChangeKinds};

/// Immutable ignore rules for a watch session.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use nr_core::{ChangeKind, ChangeKinds, IgnoreRules};
///
/// let rules = IgnoreRules::new(["./src/gen.go"], [ChangeKind::Chmod]);
/// assert!(rules.ignores_subject(Utf8Path::new("./src/gen.go")));
/// assert!(rules.ignores_all(&ChangeKinds::single(ChangeKind::Chmod)));
/// assert!(!rules.ignores_all(&ChangeKinds::single(ChangeKind::Write)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    subjects: FxHashSet<String>,
    kinds: FxHashSet<ChangeKind>,
}

impl IgnoreRules {
    /// Builds rules from explicit subjects and kinds.
    #[must_use]
    pub fn new<P>(
        subjects: impl IntoIterator<Item = P>,
        kinds: impl IntoIterator<Item = ChangeKind>,
    ) -> Self
    where
        P: Into<Utf8PathBuf>,
    {
        Self {
            subjects: subjects
                .into_iter()
                .map(|subject| Into::<Utf8PathBuf>::into(subject).into_string())
                .collect(),
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Rules that ignore nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            subjects: fx_hash_set(),
            kinds: fx_hash_set(),
        }
    }

    /// Builds rules from a session configuration, parsing the kind labels.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        let kinds = config
            .ignore_events
            .iter()
            .map(|label| label.parse::<ChangeKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.ignore_paths.iter().cloned(), kinds))
    }

    /// Returns `true` if `subject` exactly matches an ignored subject.
    #[inline]
    #[must_use]
    pub fn ignores_subject(&self, subject: &Utf8Path) -> bool {
        self.subjects.contains(subject.as_str())
    }

    /// Returns `true` if `kind` is ignored.
    #[inline]
    #[must_use]
    pub fn ignores_kind(&self, kind: ChangeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns `true` if every kind in `kinds` is ignored.
    ///
    /// An empty set is never considered ignored: only notifications that
    /// affirmatively carry nothing but ignored kinds are suppressed.
    #[must_use]
    pub fn ignores_all(&self, kinds: &ChangeKinds) -> bool {
        !kinds.is_empty() && kinds.iter().all(|kind| self.ignores_kind(kind))
    }
}
