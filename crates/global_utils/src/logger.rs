use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info";

/// Keeps the non-blocking writer flushing until dropped.
pub struct LoggerGuard {
    _guard: WorkerGuard,
}

/// Installs the global `tracing` subscriber, filter taken from `RUST_LOG`.
///
/// Calling it again is harmless: the first installed subscriber stays active.
pub fn init_logger() -> LoggerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(writer))
        .try_init();
    if let Err(err) = installed {
        tracing::debug!("Logger already initialized: {err}");
    }

    LoggerGuard { _guard: guard }
}
