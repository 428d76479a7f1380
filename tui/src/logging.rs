use cockpit_core::config::LOG_FILE;
use cockpit_core::config::LogConfig;
use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to `<log dir>/cockpit.log`; the terminal belongs to
/// the UI. Keep the returned guard alive until exit so buffered lines flush.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }
    let dir = config.resolved_dir()?;
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(Some(guard))
}

/// `RUST_LOG` wins; otherwise the configured level, or `warn` if that is not a
/// valid directive.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}
