use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr so stdout stays clean for tables and JSON.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to this crate only.
pub fn init_logging(level: &str) {
    let default_filter = format!("pension_projection={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();

    tracing::debug!("logging initialized (default filter {default_filter})");
}
