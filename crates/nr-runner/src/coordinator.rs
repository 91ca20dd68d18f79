//! Run coordination.
//!
//! The [`RunCoordinator`] is the top-level loop of a watch session. It forces
//! one run at start-up, then waits for either a pending trigger from the
//! batcher or an error from the watch backend.
//!
//! # State Machine
//!
//! ```text
//!            forced / batched trigger
//!   ┌──────┐ ───────────────────────► ┌─────────┐
//!   │ Idle │                          │ Running │
//!   └──────┘ ◄─────────────────────── └─────────┘
//!      │      success / exit failure       │
//!      │                                   │ launch failure
//!      │ backend error                     ▼
//!      └──────────────────────────► ┌────────────┐
//!                                   │ Terminated │
//!                                   └────────────┘
//! ```
//!
//! Commands run to completion inside the loop, so a trigger is never
//! consumed while a command is running. Triggers produced meanwhile collapse
//! into the batcher's single pending slot and cause at most one more run.

use std::fmt;
use std::time::Instant;

use tokio::sync::mpsc;

use nr_watcher::{ErrorStream, TriggerReceiver};

use crate::command::CommandSpec;
use crate::error::SessionError;
use crate::executor::{CommandExecutor, RunOutcome};

/// Where the coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Waiting for a trigger or an error.
    #[default]
    Idle,
    /// A command is executing.
    Running,
    /// The session has ended. Absorbing.
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Terminated => "terminated",
        })
    }
}

/// What caused a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// The synthetic run queued at start-up.
    Forced,
    /// A coalesced trigger from the batcher.
    Batched,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forced => "forced",
            Self::Batched => "batched",
        })
    }
}

/// Serializes command execution and owns the session's terminal condition.
///
/// # Examples
///
/// ```no_run
/// use nr_runner::{CommandSpec, ProcessExecutor, RunCoordinator};
/// use nr_watcher::trigger_slot;
///
/// # async fn example() -> Result<(), nr_runner::SessionError> {
/// let (_trigger_tx, triggers) = trigger_slot();
/// let (_error_tx, errors) = tokio::sync::mpsc::unbounded_channel();
///
/// let spec = CommandSpec::parse("make build")?;
/// let mut coordinator = RunCoordinator::new(spec, ProcessExecutor);
/// coordinator.run(triggers, errors).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RunCoordinator<E> {
    spec: CommandSpec,
    executor: E,
    state: SessionState,
    runs: u64,
    failures: u64,
}

impl<E: CommandExecutor> RunCoordinator<E> {
    /// Creates an idle coordinator for `spec`.
    #[must_use]
    pub fn new(spec: CommandSpec, executor: E) -> Self {
        Self {
            spec,
            executor,
            state: SessionState::Idle,
            runs: 0,
            failures: 0,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the number of runs that started and finished.
    #[inline]
    #[must_use]
    pub const fn runs(&self) -> u64 {
        self.runs
    }

    /// Returns the number of runs that exited unsuccessfully.
    #[inline]
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Returns the command this coordinator runs.
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Runs the session loop until a fatal condition.
    ///
    /// Returns `Ok(())` only once the trigger slot is closed and drained,
    /// which happens when the batcher has stopped.
    ///
    /// Calling this on a terminated coordinator returns
    /// [`SessionError::AlreadyTerminated`] without running anything.
    pub async fn run(
        &mut self,
        mut triggers: TriggerReceiver,
        mut errors: ErrorStream,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Terminated {
            return Err(SessionError::AlreadyTerminated);
        }

        // Queued before the first wait so the forced run is always observed first.
        let (forced_tx, mut forced) = mpsc::channel::<()>(1);
        let _ = forced_tx.try_send(());
        drop(forced_tx);

        loop {
            let source = tokio::select! {
                biased;
                Some(()) = forced.recv() => TriggerSource::Forced,
                Some(error) = errors.recv() => {
                    tracing::error!(error = %error, "Watch backend failed, ending session");
                    self.transition(SessionState::Terminated);
                    return Err(error.into());
                }
                trigger = triggers.recv() => match trigger {
                    Some(()) => TriggerSource::Batched,
                    None => {
                        tracing::debug!("Trigger slot closed, nothing left to run");
                        self.transition(SessionState::Terminated);
                        return Ok(());
                    }
                },
            };

            self.execute(source).await?;
        }
    }

    async fn execute(&mut self, source: TriggerSource) -> Result<(), SessionError> {
        self.transition(SessionState::Running);
        tracing::info!(command = %self.spec, trigger = %source, "Running command");

        let started = Instant::now();
        let outcome = self.executor.execute(&self.spec).await;
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            RunOutcome::LaunchFailure { program, source } => {
                tracing::error!(program = %program, error = %source, "Command could not be started");
                self.transition(SessionState::Terminated);
                Err(SessionError::Launch { program, source })
            }
            finished => {
                self.runs += 1;
                if let RunOutcome::ExitFailure { code, .. } = finished {
                    self.failures += 1;
                    tracing::warn!(
                        elapsed_ms,
                        code = ?code,
                        "cmd failed: {}",
                        finished.output_lossy()
                    );
                } else {
                    tracing::info!(elapsed_ms, "cmd: {}", finished.output_lossy());
                }
                self.transition(SessionState::Idle);
                Ok(())
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "Session state");
        self.state = next;
    }
}
