//! Run coordination for notifyrun.
//!
//! This crate owns everything downstream of the pending-trigger slot: the
//! command to run, how it is executed, and the loop that decides when the
//! watch session is over.
//!
//! # Session Lifecycle
//!
//! ```text
//! SessionConfig ─► validate ─► CommandSpec::parse ─► IgnoreRules
//!                                                        │
//!        NotificationSource::watch (each path) ◄─────────┘
//!                          │
//!                          ▼
//!      Batcher task ──trigger slot──► RunCoordinator ──► CommandExecutor
//!                                          ▲
//!                  backend errors ─────────┘
//! ```
//!
//! A session returns only with a [`SessionError`]: a launch failure, a
//! backend error, or a configuration problem found before the first run.
//!
//! # Usage
//!
//! ```no_run
//! use nr_core::SessionConfig;
//!
//! # async fn example() -> Result<(), nr_runner::SessionError> {
//! let config = SessionConfig::new(["./src"], "make build");
//! nr_runner::run_session(&config).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod session;

pub use command::CommandSpec;
pub use coordinator::{RunCoordinator, SessionState, TriggerSource};
pub use error::SessionError;
pub use executor::{CommandExecutor, ProcessExecutor, RunOutcome};
pub use session::{Session, run_session, run_session_with};
