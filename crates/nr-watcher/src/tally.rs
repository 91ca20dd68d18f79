//! Suppression tally and flush reports.
//!
//! The [`SuppressionTally`] counts classification messages between flushes.
//! It is owned by the batcher loop alone, so it needs no locking. A flush
//! drains it into a [`FlushReport`] and leaves it empty.
//!
//! The tally is bounded: once [`MAX_TALLY_ENTRIES`] distinct messages are
//! held, further new messages are only counted in an overflow counter.

use std::fmt;

use nr_core::{FxHashMap, fx_hash_map};

/// Maximum number of distinct messages itemized between flushes.
pub const MAX_TALLY_ENTRIES: usize = 1024;

/// Why a flush happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// An accepted notification filled the pending-trigger slot.
    Trigger,
    /// The periodic flush timer fired with a non-empty tally.
    Periodic,
}

impl FlushReason {
    /// Returns the label used in log output.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Periodic => "periodic",
        }
    }
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Message-to-count accumulator.
///
/// # Examples
///
/// ```
/// use nr_watcher::{FlushReason, SuppressionTally};
///
/// let mut tally = SuppressionTally::new();
/// tally.record("accept event: \"a.go\": WRITE");
/// tally.record("accept event: \"a.go\": WRITE");
/// assert_eq!(tally.count("accept event: \"a.go\": WRITE"), 2);
///
/// let report = tally.flush(FlushReason::Trigger);
/// assert_eq!(report.total(), 2);
/// assert!(tally.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SuppressionTally {
    counts: FxHashMap<String, u64>,
    overflow: u64,
    capacity: usize,
}

impl Default for SuppressionTally {
    fn default() -> Self {
        Self::new()
    }
}

impl SuppressionTally {
    /// Creates an empty tally bounded at [`MAX_TALLY_ENTRIES`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_TALLY_ENTRIES)
    }

    /// Creates an empty tally that itemizes at most `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: fx_hash_map(),
            overflow: 0,
            capacity,
        }
    }

    /// Counts one occurrence of `message`.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(count) = self.counts.get_mut(&message) {
            *count += 1;
        } else if self.counts.len() < self.capacity {
            self.counts.insert(message, 1);
        } else {
            self.overflow += 1;
        }
    }

    /// Returns the count recorded for `message`.
    #[must_use]
    pub fn count(&self, message: &str) -> u64 {
        self.counts.get(message).copied().unwrap_or(0)
    }

    /// Returns the number of occurrences that were not itemized.
    #[inline]
    #[must_use]
    pub const fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Returns the number of distinct itemized messages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if nothing has been recorded since the last flush.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() && self.overflow == 0
    }

    /// Drains the tally into a report, leaving it empty.
    pub fn flush(&mut self, reason: FlushReason) -> FlushReport {
        let entries = std::mem::take(&mut self.counts).into_iter().collect();
        let overflow = std::mem::take(&mut self.overflow);
        FlushReport {
            reason,
            entries,
            overflow,
        }
    }
}

/// The contents of one flush.
///
/// Entry order is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    /// Why the flush happened.
    pub reason: FlushReason,

    /// Each distinct message with its count.
    pub entries: Vec<(String, u64)>,

    /// Occurrences of messages beyond the itemized capacity.
    pub overflow: u64,
}

impl FlushReport {
    /// Returns the total number of recorded occurrences.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum::<u64>() + self.overflow
    }

    /// Returns the count for `message`, or zero.
    #[must_use]
    pub fn count(&self, message: &str) -> u64 {
        self.entries
            .iter()
            .find(|(m, _)| m == message)
            .map_or(0, |(_, count)| *count)
    }

    /// Returns `true` if any entry's message contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|(m, _)| m.contains(needle))
    }
}

impl fmt::Display for FlushReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} flushed batched messages:", self.reason)?;
        for (message, count) in &self.entries {
            write!(f, "\n[{count}] {message}")?;
        }
        if self.overflow > 0 {
            write!(f, "\n[{}] (further distinct events not itemized)", self.overflow)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_flush_resets() {
        let mut tally = SuppressionTally::new();
        tally.record("a");
        tally.record("b");
        tally.record("a");
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.count("a"), 2);

        let report = tally.flush(FlushReason::Periodic);
        assert_eq!(report.reason, FlushReason::Periodic);
        assert_eq!(report.count("a"), 2);
        assert_eq!(report.count("b"), 1);
        assert_eq!(report.total(), 3);
        assert!(tally.is_empty());
        assert_eq!(tally.count("a"), 0);
    }

    #[test]
    fn test_bounded_capacity_counts_overflow() {
        let mut tally = SuppressionTally::with_capacity(2);
        tally.record("a");
        tally.record("b");
        tally.record("c");
        tally.record("d");
        tally.record("a");

        assert_eq!(tally.len(), 2);
        assert_eq!(tally.count("a"), 2);
        assert_eq!(tally.overflow(), 2);

        let report = tally.flush(FlushReason::Trigger);
        assert_eq!(report.total(), 5);
        assert_eq!(tally.overflow(), 0);
        assert!(tally.is_empty());
    }

    #[test]
    fn test_report_display() {
        let mut tally = SuppressionTally::new();
        tally.record(r#"ignore event kind: "./src/a.go": CHMOD"#);
        tally.record(r#"ignore event kind: "./src/a.go": CHMOD"#);
        let report = tally.flush(FlushReason::Periodic);

        insta::assert_snapshot!(report.to_string(), @r#"
        periodic flushed batched messages:
        [2] ignore event kind: "./src/a.go": CHMOD
        "#);
    }

    #[test]
    fn test_report_display_with_overflow() {
        let mut tally = SuppressionTally::with_capacity(0);
        tally.record("a");
        let report = tally.flush(FlushReason::Trigger);
        assert_eq!(
            report.to_string(),
            "trigger flushed batched messages:\n[1] (further distinct events not itemized)"
        );
    }
}
