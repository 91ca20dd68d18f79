//! Watch session wiring.
//!
//! [`run_session`] is the public entry point: it validates a
//! [`SessionConfig`], registers every watch path, then drives a [`Session`]
//! until something fatal happens. [`Session`] is the part that does not
//! touch the filesystem and can be fed from plain channels.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use nr_core::{DEFAULT_FLUSH_INTERVAL_MS, IgnoreRules, SessionConfig};
use nr_watcher::{
    Batcher, ErrorStream, EventFilter, NotificationSource, NotificationStream, Reporter,
    TracingReporter, trigger_slot,
};

use crate::command::CommandSpec;
use crate::coordinator::RunCoordinator;
use crate::error::SessionError;
use crate::executor::{CommandExecutor, ProcessExecutor};

/// Runs a watch session with real child processes.
///
/// Returns only on a fatal condition: invalid configuration, a watch path
/// that cannot be registered, a command that cannot be started, or an error
/// from the watch backend. Non-zero exits are logged and the session
/// continues.
pub async fn run_session(config: &SessionConfig) -> Result<(), SessionError> {
    run_session_with(config, ProcessExecutor).await
}

/// Runs a watch session with the given executor.
pub async fn run_session_with<E: CommandExecutor>(
    config: &SessionConfig,
    executor: E,
) -> Result<(), SessionError> {
    config.validate()?;
    let spec = CommandSpec::parse(&config.command)?;
    let rules = IgnoreRules::from_config(config)?;

    // Dropping `source` on an early return releases the paths already watched.
    let mut source = NotificationSource::new(config.recursive)?;
    for path in &config.watch_paths {
        source.watch(path)?;
    }
    tracing::info!(
        paths = config.watch_paths.len(),
        recursive = config.recursive,
        command = %spec,
        "Watching for changes"
    );

    let (guard, notifications, errors) = source.into_parts();
    let result = Session::new(spec, rules, executor)
        .with_flush_interval(config.flush_interval())
        .run(notifications, errors)
        .await;
    drop(guard);
    result
}

/// A batcher and a run coordinator connected by a pending-trigger slot.
#[derive(Debug)]
pub struct Session<E, R = TracingReporter> {
    spec: CommandSpec,
    filter: EventFilter,
    executor: E,
    reporter: R,
    flush_interval: Duration,
}

impl<E: CommandExecutor> Session<E> {
    /// Creates a session that reports flushes through `tracing`.
    #[must_use]
    pub fn new(spec: CommandSpec, rules: IgnoreRules, executor: E) -> Self {
        Self {
            spec,
            filter: EventFilter::new(rules),
            executor,
            reporter: TracingReporter,
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }
}

impl<E: CommandExecutor, R: Reporter> Session<E, R> {
    /// Replaces the flush reporter.
    #[must_use]
    pub fn with_reporter<S: Reporter>(self, reporter: S) -> Session<E, S> {
        Session {
            spec: self.spec,
            filter: self.filter,
            executor: self.executor,
            reporter,
            flush_interval: self.flush_interval,
        }
    }

    /// Sets the periodic flush interval.
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Drives the session until the coordinator stops.
    ///
    /// The batcher runs as its own task and is cancelled and joined before
    /// this returns, so its final flush is always reported.
    pub async fn run(
        self,
        notifications: NotificationStream,
        errors: ErrorStream,
    ) -> Result<(), SessionError> {
        let (trigger_tx, trigger_rx) = trigger_slot();
        let cancel = CancellationToken::new();

        let batcher = Batcher::new(self.filter, trigger_tx)
            .with_reporter(self.reporter)
            .with_flush_interval(self.flush_interval);
        let batcher_task = tokio::spawn(batcher.run(notifications, cancel.clone()));

        let mut coordinator = RunCoordinator::new(self.spec, self.executor);
        let result = coordinator.run(trigger_rx, errors).await;

        cancel.cancel();
        match batcher_task.await {
            Ok(stats) => tracing::debug!(?stats, "Batcher joined"),
            Err(e) => tracing::warn!(error = %e, "Batcher task failed"),
        }

        tracing::info!(
            runs = coordinator.runs(),
            failures = coordinator.failures(),
            "Watch session ended"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::tests::{FakeExecutor, Scripted};

    use camino::Utf8PathBuf;
    use nr_core::{ChangeKind, ChangeNotification, ConfigError};
    use nr_watcher::{FlushReason, FlushReport, WatchError};
    use tokio::sync::mpsc;

    fn session(rules: IgnoreRules, executor: FakeExecutor) -> Session<FakeExecutor> {
        Session::new(CommandSpec::parse("make build").unwrap(), rules, executor)
    }

    fn notification(path: &str, kind: ChangeKind) -> ChangeNotification {
        ChangeNotification::new(path, kind)
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_triggers_and_chmod_is_tallied() {
        let rules = IgnoreRules::new(Vec::<&str>::new(), [ChangeKind::Chmod]);
        let (executor, mut starts) = FakeExecutor::new().notify_starts();
        let (reports_tx, mut reports) = mpsc::unbounded_channel::<FlushReport>();
        let (notes_tx, notes_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();

        let session = session(rules, executor.clone()).with_reporter(reports_tx);
        let task = tokio::spawn(session.run(notes_rx, errors_rx));

        // Forced run with no notifications at all.
        assert_eq!(starts.recv().await, Some(1));

        notes_tx
            .send(notification("./src/a.go", ChangeKind::Write))
            .unwrap();
        assert_eq!(starts.recv().await, Some(2));
        let report = reports.recv().await.unwrap();
        assert_eq!(report.reason, FlushReason::Trigger);
        assert_eq!(report.count(r#"accept event: "./src/a.go": WRITE"#), 1);

        notes_tx
            .send(notification("./src/a.go", ChangeKind::Chmod))
            .unwrap();
        let report = reports.recv().await.unwrap();
        assert_eq!(report.reason, FlushReason::Periodic);
        assert_eq!(report.count(r#"ignore event kind: "./src/a.go": CHMOD"#), 1);
        assert_eq!(executor.started(), 2);

        errors_tx.send(WatchError::Overflow).unwrap();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(SessionError::Watch(WatchError::Overflow))));
        assert_eq!(executor.started(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_during_run_coalesces_to_one_run() {
        let (executor, mut starts) = FakeExecutor::new()
            .with_delay(Duration::from_secs(1))
            .notify_starts();
        let (notes_tx, notes_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();

        let session = session(IgnoreRules::none(), executor.clone());
        let task = tokio::spawn(session.run(notes_rx, errors_rx));

        assert_eq!(starts.recv().await, Some(1));
        for i in 0..10 {
            notes_tx
                .send(notification(&format!("./src/{i}.go"), ChangeKind::Write))
                .unwrap();
        }

        assert_eq!(starts.recv().await, Some(2));
        errors_tx.send(WatchError::Overflow).unwrap();
        assert!(task.await.unwrap().is_err());

        assert_eq!(executor.started(), 2);
        assert_eq!(executor.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_subject_never_runs() {
        let rules = IgnoreRules::new(["./build/out.bin"], Vec::<ChangeKind>::new());
        let (executor, mut starts) = FakeExecutor::new().notify_starts();
        let (notes_tx, notes_rx) = mpsc::unbounded_channel();
        let (_errors_tx, errors_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(session(rules, executor.clone()).run(notes_rx, errors_rx));
        assert_eq!(starts.recv().await, Some(1));

        notes_tx
            .send(notification("./build/out.bin", ChangeKind::Write))
            .unwrap();
        drop(notes_tx);

        // The batcher exits on stream close, which closes the trigger slot.
        assert!(task.await.unwrap().is_ok());
        assert_eq!(executor.started(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_failure_keeps_session_alive() {
        let (executor, mut starts) = FakeExecutor::new()
            .with_script(&[Scripted::ExitFailure])
            .notify_starts();
        let (notes_tx, notes_rx) = mpsc::unbounded_channel();
        let (_errors_tx, errors_rx) = mpsc::unbounded_channel();

        let session = session(IgnoreRules::none(), executor.clone());
        let task = tokio::spawn(session.run(notes_rx, errors_rx));
        assert_eq!(starts.recv().await, Some(1));

        notes_tx
            .send(notification("./src/a.go", ChangeKind::Write))
            .unwrap();
        assert_eq!(starts.recv().await, Some(2));

        drop(notes_tx);
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_session_rejects_invalid_config() {
        let executor = FakeExecutor::new();

        let config = SessionConfig::new(Vec::<Utf8PathBuf>::new(), "make");
        let err = run_session_with(&config, executor.clone()).await.unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::NoWatchPaths)));

        let config = SessionConfig::new(["."], "make 'build");
        let err = run_session_with(&config, executor.clone()).await.unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::CommandParse { .. })));

        let mut config = SessionConfig::new(["."], "make");
        config.ignore_events = vec!["TOUCH".to_owned()];
        let err = run_session_with(&config, executor.clone()).await.unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::UnknownEventKind(_))));

        assert_eq!(executor.started(), 0);
    }

    #[tokio::test]
    async fn test_run_session_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let existing = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let missing = existing.join("does-not-exist");

        let executor = FakeExecutor::new();
        let config = SessionConfig::new([existing, missing], "make");
        let err = run_session_with(&config, executor.clone()).await.unwrap_err();

        assert!(err.is_configuration());
        assert!(matches!(err, SessionError::Watch(WatchError::PathNotFound(_))));
        assert_eq!(executor.started(), 0);
    }

    #[tokio::test]
    async fn test_run_session_launch_failure_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        let config = SessionConfig::new([path], "notifyrun-test-no-such-program");
        let err = run_session(&config).await.unwrap_err();

        assert!(err.is_launch());
        insta::assert_snapshot!(
            err.to_string().split(':').next().unwrap_or_default(),
            @"failed to launch 'notifyrun-test-no-such-program'"
        );
    }
}
