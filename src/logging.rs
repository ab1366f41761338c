//! Tracing setup.
//!
//! While the terminal shell owns the screen, events go to a timestamped file
//! under [`Config::logs_path`]. Every subcommand logs to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the file writer alive; buffered events are flushed on drop
pub struct LoggingHandle {
    guard: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingHandle {
    /// Session log file, when logging to a file
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Flush buffered events, then point the user at the session log if
    /// anything was written to it
    pub fn finish(self) {
        let Self { guard, log_file } = self;
        drop(guard);
        if let Some(path) = log_file {
            if path.metadata().is_ok_and(|m| m.len() > 0) {
                eprintln!("Session log: {}", path.display());
            }
        }
    }

    pub fn is_buffered(&self) -> bool {
        self.guard.is_some()
    }
}

/// `stepgraph-20261019T101500Z.log` for a session started at `started`
pub fn log_file_name(started: DateTime<Utc>) -> String {
    format!("stepgraph-{}.log", started.format("%Y%m%dT%H%M%SZ"))
}

/// Filter directive: `RUST_LOG` wins, then `--debug`, then the configured level
fn filter_directive(config: &Config, debug_override: bool, rust_log: Option<String>) -> String {
    rust_log.unwrap_or_else(|| {
        if debug_override {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        }
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let directive = filter_directive(config, debug_override, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    let (writer, guard, log_file) = if is_tui_mode && config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

        let file_name = log_file_name(Utc::now());
        let appender = tracing_appender::rolling::never(&logs_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        (
            BoxMakeWriter::new(non_blocking),
            Some(guard),
            Some(logs_dir.join(file_name)),
        )
    } else {
        (BoxMakeWriter::new(std::io::stderr), None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(log_file.is_none())
                .with_writer(writer),
        )
        .try_init()
        .context("Logging was already initialized")?;

    Ok(LoggingHandle { guard, log_file })
}
