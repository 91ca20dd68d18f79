//! CLI entry point for notifyrun.
//!
//! Watches files and directories and re-runs a command whenever something
//! relevant changes.
//!
//! # Usage
//!
//! ```bash
//! notifyrun [OPTIONS] <PATHS>...
//!
//! # Rebuild on every change under ./src
//! notifyrun --recursive --exec "make build" ./src
//!
//! # Skip permission-only changes and a generated file
//! notifyrun --exec "go test ./..." --ignore-event chmod --ignore ./gen.go .
//!
//! # Load defaults from a JSON file, override the command
//! notifyrun --config notifyrun.json --exec "cargo check"
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use nr_core::SessionConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Run a command whenever watched files change.
///
/// Change notifications are filtered, coalesced, and turned into at most one
/// pending run. The command always runs once at start-up.
#[derive(Parser, Debug)]
#[command(name = "notifyrun", version, about, long_about = None)]
struct Cli {
    /// Files and directories to watch.
    #[arg(value_name = "PATHS", required_unless_present = "config")]
    paths: Vec<Utf8PathBuf>,

    /// Command to run on every change.
    ///
    /// Split with shell quoting rules; nothing is expanded.
    #[arg(short = 'e', long = "exec", value_name = "CMD", env = "NOTIFYRUN_EXEC")]
    exec: Option<String>,

    /// Path whose changes never trigger a run. Repeatable.
    #[arg(short, long = "ignore", value_name = "PATH")]
    ignore: Vec<Utf8PathBuf>,

    /// Change kind that never triggers a run on its own. Repeatable.
    ///
    /// One of CREATE, WRITE, REMOVE, RENAME, CHMOD (case-insensitive).
    #[arg(long = "ignore-event", value_name = "KIND")]
    ignore_event: Vec<String>,

    /// Period between flushes of the suppressed-notification tally.
    #[arg(long, value_name = "MS")]
    flush_interval_ms: Option<u64>,

    /// Watch directories recursively.
    #[arg(short, long)]
    recursive: bool,

    /// JSON configuration file. Command-line values take precedence.
    #[arg(short, long, value_name = "FILE", env = "NOTIFYRUN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// The `notify` backend and `mio` are filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`SessionConfig`] from the optional config file and CLI flags.
///
/// Scalar flags replace file values; repeatable flags extend them. Paths
/// given on the command line replace the file's watch list.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, or if no
/// command was given anywhere.
fn build_config(cli: &Cli) -> color_eyre::Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .wrap_err_with(|| format!("Failed to load config file: {path}"))?,
        None => SessionConfig::default(),
    };

    if !cli.paths.is_empty() {
        config.watch_paths.clone_from(&cli.paths);
    }
    if let Some(exec) = &cli.exec {
        config.command.clone_from(exec);
    }
    config.ignore_paths.extend(cli.ignore.iter().cloned());
    config
        .ignore_events
        .extend(cli.ignore_event.iter().cloned());
    if let Some(ms) = cli.flush_interval_ms {
        config.flush_interval_ms = ms;
    }
    config.recursive |= cli.recursive;

    if config.command.trim().is_empty() {
        return Err(eyre!("must select an action type: --exec is required"));
    }

    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the watch session until it fails or the process is terminated.
///
/// # Errors
///
/// Returns the session's terminal error.
async fn run_watch(config: SessionConfig) -> color_eyre::Result<()> {
    info!(
        paths = config.watch_paths.len(),
        command = %config.command,
        "Starting notifyrun"
    );

    // Handle SIGTERM for graceful shutdown on Unix
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = nr_runner::run_session(&config) => {
                result?;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        nr_runner::run_session(&config).await?;
    }

    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge config file and flags, then run
    let config = build_config(&cli)?;
    run_watch(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("notifyrun").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_paths_required_without_config() {
        let result = Cli::try_parse_from(["notifyrun", "--exec", "make"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_config_from_flags() {
        let cli = parse(&[
            "--exec",
            "make build",
            "--ignore",
            "./gen.go",
            "--ignore-event",
            "chmod",
            "--ignore-event",
            "RENAME",
            "--flush-interval-ms",
            "250",
            "-r",
            "./src",
            "./lib",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.watch_paths, ["./src", "./lib"]);
        assert_eq!(config.command, "make build");
        assert_eq!(config.ignore_paths, ["./gen.go"]);
        assert_eq!(config.ignore_events, ["chmod", "RENAME"]);
        assert_eq!(config.flush_interval_ms, 250);
        assert!(config.recursive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_command_is_rejected() {
        let cli = Cli {
            exec: None,
            ..parse(&["./src"])
        };
        let err = build_config(&cli).unwrap_err();
        assert_eq!(err.to_string(), "must select an action type: --exec is required");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("notifyrun.json")).unwrap();
        std::fs::write(
            &path,
            r#"{
                "watch_paths": ["./from-file"],
                "command": "make",
                "ignore_events": ["CHMOD"],
                "flush_interval_ms": 1000
            }"#,
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            path.as_str(),
            "--exec",
            "cargo check",
            "--ignore-event",
            "write",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.watch_paths, ["./from-file"]);
        assert_eq!(config.command, "cargo check");
        assert_eq!(config.ignore_events, ["CHMOD", "write"]);
        assert_eq!(config.flush_interval_ms, 1000);
        assert!(!config.recursive);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let cli = parse(&["--config", "./does-not-exist.json", "--exec", "make"]);
        let err = build_config(&cli).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }
}
