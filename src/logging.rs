//! Logging setup for the binary.
//!
//! Console output goes to stderr at the configured level, or whatever
//! `RUST_LOG` asks for. When `[logging] dir` is set, a second layer writes
//! rotated files there through a non-blocking writer.

use std::path::Path;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::domain::config::LogSettings;
use crate::domain::error::StockError;

pub const LOG_FILE_PREFIX: &str = "stockcache";
const LOG_FILE_SUFFIX: &str = "log";
/// The active file plus three rotated ones.
const MAX_LOG_FILES: usize = 4;

/// Parse a configured level name, falling back to `info`.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// `rust_log` wins when it parses; otherwise the configured level with HTTP
/// client internals held at `warn`.
pub fn console_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| level_filter(level))
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(parse_level(level)).into())
        .parse_lossy("")
        .add_directive(quiet("reqwest"))
        .add_directive(quiet("hyper"))
}

/// HTTP client internals only log warnings and above.
fn quiet(target: &str) -> Directive {
    format!("{target}=warn")
        .parse()
        .unwrap_or_else(|_| LevelFilter::WARN.into())
}

/// Daily-rotated `stockcache.<date>.log` under `dir`, created if missing.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, StockError> {
    std::fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(|e| StockError::ConfigInvalid {
            section: "logging".into(),
            key: "dir".into(),
            reason: e.to_string(),
        })
}

/// Install the global subscriber. The returned guard flushes the file log
/// when dropped, so the caller holds it for the whole command. A second
/// call leaves the first subscriber in place.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>, StockError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let console = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter(rust_log.as_deref(), &settings.level));

    let (file, guard) = match &settings.dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(level_filter(&settings.file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
    Ok(guard)
}
