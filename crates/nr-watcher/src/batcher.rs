//! Trigger batching.
//!
//! The [`Batcher`] sits between the notification stream and the run
//! coordinator. It owns the [`EventFilter`], the [`SuppressionTally`] and the
//! sending half of the pending-trigger slot, and is driven by exactly two wake
//! sources: the next notification, and a periodic flush timer.
//!
//! # Coalescing
//!
//! The pending-trigger slot is a channel of capacity one used with
//! `try_send`. When an accepted notification arrives and the slot is empty,
//! the send succeeds and the tally is flushed with
//! [`FlushReason::Trigger`]. When the slot is already full the send is
//! dropped and the tally keeps accumulating; a burst of accepted
//! notifications therefore produces at most one pending run.
//!
//! ```text
//!   notification ─► classify ─► tally.record
//!                                   │
//!                         accepted? │
//!                                   ▼
//!                     try_send(()) on slot (cap 1)
//!                      │ Ok              │ Full
//!                      ▼                 ▼
//!              flush(Trigger)        coalesced
//!
//!   timer tick ─► tally non-empty? ─► flush(Periodic)
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use nr_core::{ChangeNotification, DEFAULT_FLUSH_INTERVAL_MS};

use crate::filter::{Classification, EventFilter};
use crate::report::{Reporter, TracingReporter};
use crate::source::NotificationStream;
use crate::tally::{FlushReason, SuppressionTally};

/// Sending half of the pending-trigger slot.
pub type TriggerSender = mpsc::Sender<()>;

/// Receiving half of the pending-trigger slot.
pub type TriggerReceiver = mpsc::Receiver<()>;

/// Creates a pending-trigger slot holding at most one unconsumed trigger.
#[must_use]
pub fn trigger_slot() -> (TriggerSender, TriggerReceiver) {
    mpsc::channel(1)
}

/// Counters describing what the batcher has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// Notifications ignored because of their subject.
    pub ignored_by_name: u64,
    /// Notifications ignored because of their kinds.
    pub ignored_by_kind: u64,
    /// Notifications accepted.
    pub accepted: u64,
    /// Accepted notifications that filled the pending-trigger slot.
    pub triggers_sent: u64,
    /// Accepted notifications dropped because a trigger was already pending.
    pub coalesced: u64,
    /// Flushes emitted, for either reason.
    pub flushes: u64,
}

impl BatcherStats {
    /// Returns the total number of notifications classified.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.ignored_by_name + self.ignored_by_kind + self.accepted
    }
}

/// Filters notifications, tallies them and coalesces accepted ones into
/// pending triggers.
///
/// # Examples
///
/// ```
/// use nr_core::{ChangeKind, ChangeNotification, IgnoreRules};
/// use nr_watcher::{Batcher, EventFilter, trigger_slot};
///
/// let (tx, mut rx) = trigger_slot();
/// let mut batcher = Batcher::new(EventFilter::new(IgnoreRules::none()), tx);
///
/// for _ in 0..3 {
///     batcher.handle(&ChangeNotification::new("./src/a.go", ChangeKind::Write));
/// }
///
/// // Three accepted notifications, one pending trigger.
/// assert!(rx.try_recv().is_ok());
/// assert!(rx.try_recv().is_err());
/// assert_eq!(batcher.stats().coalesced, 2);
/// ```
#[derive(Debug)]
pub struct Batcher<R = TracingReporter> {
    filter: EventFilter,
    tally: SuppressionTally,
    trigger_tx: TriggerSender,
    reporter: R,
    flush_interval: Duration,
    stats: BatcherStats,
}

impl Batcher<TracingReporter> {
    /// Creates a batcher that logs its flush reports through `tracing`.
    #[must_use]
    pub fn new(filter: EventFilter, trigger_tx: TriggerSender) -> Self {
        Self {
            filter,
            tally: SuppressionTally::new(),
            trigger_tx,
            reporter: TracingReporter,
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
            stats: BatcherStats::default(),
        }
    }
}

impl<R: Reporter> Batcher<R> {
    /// Replaces the report sink.
    #[must_use]
    pub fn with_reporter<S: Reporter>(self, reporter: S) -> Batcher<S> {
        Batcher {
            filter: self.filter,
            tally: self.tally,
            trigger_tx: self.trigger_tx,
            reporter,
            flush_interval: self.flush_interval,
            stats: self.stats,
        }
    }

    /// Sets the period of the flush timer.
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Returns the counters accumulated so far.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> BatcherStats {
        self.stats
    }

    /// Returns the tally accumulated since the last flush.
    #[inline]
    #[must_use]
    pub fn tally(&self) -> &SuppressionTally {
        &self.tally
    }

    /// Classifies and tallies one notification, attempting a trigger send if
    /// it is accepted.
    pub fn handle(&mut self, notification: &ChangeNotification) -> Classification {
        let classification = self.filter.classify(notification);
        self.tally.record(classification.message(notification));

        match classification {
            Classification::IgnoredByName => self.stats.ignored_by_name += 1,
            Classification::IgnoredByKind => self.stats.ignored_by_kind += 1,
            Classification::Accepted => {
                self.stats.accepted += 1;
                self.try_trigger(notification);
            }
        }

        tracing::trace!(%notification, %classification, "Classified notification");
        classification
    }

    /// Flushes the tally with [`FlushReason::Periodic`] if it is non-empty.
    ///
    /// Returns `true` if a report was emitted.
    pub fn tick(&mut self) -> bool {
        if self.tally.is_empty() {
            return false;
        }
        self.flush(FlushReason::Periodic);
        true
    }

    /// Runs the batcher loop until the notification stream closes or
    /// `cancel` fires, then returns the final counters.
    ///
    /// Anything still tallied when the loop ends is flushed as periodic.
    pub async fn run(
        mut self,
        mut notifications: NotificationStream,
        cancel: CancellationToken,
    ) -> BatcherStats {
        let period = self.flush_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(flush_interval_ms = period.as_millis(), "Batcher started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("Batcher cancelled");
                    break;
                }
                notification = notifications.recv() => match notification {
                    Some(notification) => {
                        self.handle(&notification);
                    }
                    None => {
                        tracing::debug!("Notification stream closed");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        self.tick();
        tracing::debug!(stats = ?self.stats, "Batcher stopped");
        self.stats
    }

    fn try_trigger(&mut self, notification: &ChangeNotification) {
        match self.trigger_tx.try_send(()) {
            Ok(()) => {
                self.stats.triggers_sent += 1;
                self.flush(FlushReason::Trigger);
            }
            Err(TrySendError::Full(())) => {
                self.stats.coalesced += 1;
                tracing::trace!(%notification, "Trigger already pending, coalesced");
            }
            Err(TrySendError::Closed(())) => {
                tracing::debug!(%notification, "Trigger receiver gone, nothing to run");
            }
        }
    }

    fn flush(&mut self, reason: FlushReason) {
        let report = self.tally.flush(reason);
        self.stats.flushes += 1;
        self.reporter.report(report);
    }
}
