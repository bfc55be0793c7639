use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr log subscriber for the CLI.
///
/// `RUST_LOG` wins when set; otherwise `level` (normally
/// [`AppConfig::log_level`](crate::AppConfig)) is used as the filter.
/// Stdout stays reserved for command output. Calling this twice is a no-op.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
