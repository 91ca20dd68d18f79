//! Change notification source, event filtering, and trigger batching.
//!
//! This crate turns a noisy stream of filesystem notifications into a
//! single-slot "run now" signal for the run coordinator in `nr-runner`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  ChangeNotification   ┌──────────────────────────┐
//! │ NotificationSource   │ ────────────────────► │ Batcher (one task)       │
//! │ (notify backend)     │                       │  EventFilter::classify   │
//! │                      │                       │  SuppressionTally        │
//! │                      │                       │  flush timer             │
//! └──────────┬───────────┘                       └────────────┬─────────────┘
//!            │ WatchError                                     │ try_send(())
//!            │                                                ▼
//!            │                                   ┌──────────────────────────┐
//!            └─────────────────────────────────► │ pending-trigger slot (1) │
//!                       (to the coordinator)     └──────────────────────────┘
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! nr-cli ──► nr-runner ──► nr-watcher ──► nr-core
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use nr_core::IgnoreRules;
//! use nr_watcher::{Batcher, EventFilter, NotificationSource, trigger_slot};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), nr_watcher::WatchError> {
//! let mut source = NotificationSource::new(false)?;
//! source.watch(Utf8Path::new("./src"))?;
//! let (_guard, notifications, _errors) = source.into_parts();
//!
//! let (trigger_tx, mut triggers) = trigger_slot();
//! let batcher = Batcher::new(EventFilter::new(IgnoreRules::none()), trigger_tx);
//! tokio::spawn(batcher.run(notifications, CancellationToken::new()));
//!
//! while triggers.recv().await.is_some() {
//!     // run the command
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod batcher;
pub mod error;
pub mod events;
pub mod filter;
pub mod report;
pub mod source;
pub mod tally;

pub use batcher::{Batcher, BatcherStats, TriggerReceiver, TriggerSender, trigger_slot};
pub use error::WatchError;
pub use filter::{Classification, EventFilter};
pub use report::{Reporter, TracingReporter};
pub use source::{ErrorStream, NotificationSource, NotificationStream, WatchGuard};
pub use tally::{FlushReason, FlushReport, MAX_TALLY_ENTRIES, SuppressionTally};
