//! Shared logging utilities for IdeaForge binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "ideaforge=info,ideaforge_pipeline=info";
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration shared by IdeaForge binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a per-app log file and stderr output.
///
/// The log file restarts from empty once it outgrows its cap; interactive
/// sessions are short, so rotation history buys nothing here.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file = open_log_file(&log_dir, config.app_name)
        .with_context(|| format!("Failed to open log file for {}", config.app_name))?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// Get the IdeaForge home directory: ~/.ideaforge
pub fn ideaforge_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("IDEAFORGE_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ideaforge")
}

/// Get the logs directory: ~/.ideaforge/logs
pub fn logs_dir() -> PathBuf {
    ideaforge_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn open_log_file(dir: &Path, app_name: &str) -> io::Result<File> {
    let path = dir.join(format!("{}.log", sanitize_name(app_name)));
    let oversized = fs::metadata(&path)
        .map(|meta| meta.len() > MAX_LOG_FILE_SIZE)
        .unwrap_or(false);

    OpenOptions::new()
        .create(true)
        .append(!oversized)
        .truncate(oversized)
        .write(true)
        .open(&path)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
