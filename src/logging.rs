//! Structured logging init, reduced from the originating workspace's
//! `infrastructure::logging` module to what a library consumer needs: a
//! one-shot `tracing` subscriber setup. No audit trail, no rotation
//! daemon, no secret scrubbing — those are application/product concerns
//! this substrate does not carry.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// If set, logs are additionally written to a non-rotating file in
    /// this directory.
    pub log_dir: Option<PathBuf>,
    pub enable_stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            log_dir: None,
            enable_stdout: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Keeps the non-blocking file writer alive for the process lifetime.
/// Dropping this guard flushes and stops the writer thread.
pub struct LoggerGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initializes the global `tracing` subscriber. Call once at process
/// start; `spec.md`'s Non-goals exclude a CLI, but a library consumer
/// embedding this substrate still needs one bootstrap call, the way the
/// originating workspace's `LoggerImpl::init` serves its own callers.
pub fn init(config: &LogConfig) -> Result<LoggerGuard> {
    let level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stdout_layer = if config.enable_stdout {
        Some(match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stdout)
                .with_target(true)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stdout)
                .with_target(true)
                .boxed(),
        })
    } else {
        None
    };

    let (file_layer, file_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "swarm-substrate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(level = %config.level, "logging initialized");

    Ok(LoggerGuard { _file_guard: file_guard })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!("invalid log level: {other}"),
    }
}
