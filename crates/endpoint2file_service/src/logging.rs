//! Log initialisation: a compact stderr layer plus the append-only
//! `endpoint2file.log` file the service has always written.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "endpoint2file.log";

/// Install the global subscriber. The returned guard must be held for the
/// process lifetime or buffered file log lines are lost on exit.
///
/// Filter comes from `ENDPOINT2FILE_LOG_LEVEL`, falling back to `RUST_LOG`,
/// defaulting to `debug`: the file log carries request/response payloads
/// at that level.
pub fn init() -> Result<WorkerGuard, anyhow::Error> {
    let log_env = std::env::var("ENDPOINT2FILE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "debug".to_string());
    let env_filter =
        EnvFilter::try_new(&log_env).unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);
    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!(filter = %log_env, log_file = LOG_FILE, "logging initialised");
    Ok(guard)
}
