//! Flush report sinks.
//!
//! Reporting is fire-and-forget: a [`Reporter`] must not block the batcher
//! loop and has no way to fail it.

use tokio::sync::mpsc;

use crate::tally::FlushReport;

/// Receives every flush report produced by the batcher.
///
/// # Examples
///
/// ```
/// use nr_watcher::{FlushReport, Reporter};
///
/// struct Silent;
///
/// impl Reporter for Silent {
///     fn report(&self, _report: FlushReport) {}
/// }
/// ```
pub trait Reporter: Send + Sync + 'static {
    /// Handles one flush report.
    fn report(&self, report: FlushReport);
}

/// Logs flush reports through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, report: FlushReport) {
        tracing::info!(
            reason = %report.reason,
            events = report.total(),
            "{report}"
        );
    }
}

/// Forwards flush reports into an unbounded channel.
///
/// Reports are dropped silently once the receiver is gone.
impl Reporter for mpsc::UnboundedSender<FlushReport> {
    fn report(&self, report: FlushReport) {
        let _ = self.send(report);
    }
}
