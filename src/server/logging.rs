use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sea_orm=warn,sqlx::query=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs JSON to a daily-rotated file under `log_dir` and human-readable
/// lines to stdout. Keep the returned guard alive for the life of the process
/// or buffered file lines are lost.
pub fn init_logging(log_dir: &str, file_name: &str) -> WorkerGuard {
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, file_name));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false) // No ANSI colors in file
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

/// Stdout only, for short-lived command line tools.
pub fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();
}
