//! Tracing setup
//!
//! Console output follows `logging.format`. When `logging.http_log_dir` is
//! set, HTTP exchanges are also written to a daily-rolling file.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{filter_fn, EnvFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::{api::interceptors::HTTP_LOG_TARGET, config::LoggingConfig};

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process so buffered file output is flushed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "lending_client={level},lending_agent={level},sqlx=warn",
            level = config.level
        )
        .into()
    });

    let console = if config.format == "json" {
        fmt::layer().json().with_filter(filter).boxed()
    } else {
        fmt::layer().with_filter(filter).boxed()
    };

    let (http_file, guard) = match config.http_log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "http.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter_fn(|meta| meta.target() == HTTP_LOG_TARGET));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(console)
        .with(http_file)
        .try_init();

    if let Err(e) = result {
        // A subscriber is already installed (tests, embedding application)
        eprintln!("tracing subscriber not installed: {}", e);
    }

    guard
}
