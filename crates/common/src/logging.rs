//! Logging and tracing initialization.

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber for this process.
///
/// `RUST_LOG` wins over the configured level so a session can be
/// debugged without touching flags.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.finish()).ok();
    }
}

/// Initialize logging with defaults (tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
