//! Logging system initialization
//!
//! Builds the tracing subscriber from the `[logging]` section: text or JSON
//! output, to stdout or to a (optionally rotating) log file.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

type BoxedWriter = Box<dyn Write + Send + Sync>;

/// Initialize logging system based on configuration
///
/// The returned `WorkerGuard` must be kept alive for the duration of the
/// program so buffered log lines are flushed. A log file that cannot be
/// opened falls back to stdout.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let writer = build_writer(config);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.clone()));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(log_file(config).is_none());

    // 测试或嵌入场景下可能已存在全局 subscriber
    let result = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }

    guard
}

fn log_file(config: &LoggingConfig) -> Option<&str> {
    config.file.as_deref().filter(|f| !f.is_empty())
}

fn build_writer(config: &LoggingConfig) -> BoxedWriter {
    let Some(log_file) = log_file(config) else {
        return Box::new(std::io::stdout());
    };

    let path = Path::new(log_file);
    if config.enable_rotation {
        let dir = path.parent().unwrap_or(Path::new("."));
        let prefix = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("gacounter.log")
            .trim_end_matches(".log")
            .to_string();

        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
        {
            Ok(appender) => Box::new(appender),
            Err(e) => {
                eprintln!("Failed to create rolling log appender, using stdout: {}", e);
                Box::new(std::io::stdout())
            }
        }
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Failed to open log file {}, using stdout: {}", log_file, e);
                Box::new(std::io::stdout())
            }
        }
    }
}
