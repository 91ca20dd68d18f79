//! Process execution.
//!
//! The [`CommandExecutor`] trait is the seam between the run coordinator
//! and the operating system. [`ProcessExecutor`] is the real implementation;
//! tests substitute their own.

use std::borrow::Cow;
use std::future::Future;
use std::io;
use std::process::Stdio;

use crate::command::CommandSpec;

/// The result of one command execution.
#[derive(Debug)]
pub enum RunOutcome {
    /// The command ran and exited successfully.
    Success {
        /// Combined stdout and stderr.
        output: Vec<u8>,
    },

    /// The command ran but exited unsuccessfully. Recoverable.
    ExitFailure {
        /// Exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Combined stdout and stderr.
        output: Vec<u8>,
    },

    /// The command could not be started at all. Fatal.
    LaunchFailure {
        /// The program that failed to start.
        program: String,
        /// The underlying spawn error.
        source: io::Error,
    },
}

impl RunOutcome {
    /// Returns the captured output, lossily decoded as UTF-8.
    ///
    /// Empty for launch failures.
    #[must_use]
    pub fn output_lossy(&self) -> Cow<'_, str> {
        match self {
            Self::Success { output } | Self::ExitFailure { output, .. } => {
                String::from_utf8_lossy(output)
            }
            Self::LaunchFailure { .. } => Cow::Borrowed(""),
        }
    }
}

/// Runs a [`CommandSpec`] to completion.
///
/// Implementations must not return before the command has finished: the
/// coordinator relies on this to keep runs from overlapping.
pub trait CommandExecutor: Send + Sync {
    /// Runs `spec` and reports how it ended.
    fn execute(&self, spec: &CommandSpec) -> impl Future<Output = RunOutcome> + Send;
}

/// Executes commands as child processes.
///
/// Stdin is closed; stdout and stderr are captured and returned as one
/// buffer, stdout first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, spec: &CommandSpec) -> RunOutcome {
        let result = tokio::process::Command::new(spec.program())
            .args(spec.args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let mut combined = output.stdout;
                combined.extend_from_slice(&output.stderr);
                if output.status.success() {
                    RunOutcome::Success { output: combined }
                } else {
                    RunOutcome::ExitFailure {
                        code: output.status.code(),
                        output: combined,
                    }
                }
            }
            Err(source) => RunOutcome::LaunchFailure {
                program: spec.program().to_owned(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_lossy() {
        let outcome = RunOutcome::ExitFailure {
            code: Some(2),
            output: b"error: \xffbad".to_vec(),
        };
        assert!(outcome.output_lossy().starts_with("error: "));

        let outcome = RunOutcome::LaunchFailure {
            program: "nope".to_owned(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(outcome.output_lossy().is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_failure() {
        let spec = CommandSpec::parse("notifyrun-test-no-such-program --flag").unwrap();
        let outcome = ProcessExecutor.execute(&spec).await;
        match outcome {
            RunOutcome::LaunchFailure { program, source } => {
                assert_eq!(program, "notifyrun-test-no-such-program");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("Expected LaunchFailure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_combines_output() {
        let spec = CommandSpec::parse(r#"sh -c "echo out; echo err >&2""#).unwrap();
        let outcome = ProcessExecutor.execute(&spec).await;
        assert!(matches!(outcome, RunOutcome::Success { .. }));
        assert_eq!(outcome.output_lossy(), "out\nerr\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_exit_failure() {
        let spec = CommandSpec::parse(r#"sh -c "echo failing; exit 3""#).unwrap();
        match ProcessExecutor.execute(&spec).await {
            RunOutcome::ExitFailure { code, output } => {
                assert_eq!(code, Some(3));
                assert_eq!(output, b"failing\n");
            }
            other => panic!("Expected ExitFailure, got {other:?}"),
        }
    }
}
