use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Install the global subscriber. Logs go to stderr; stdout only ever carries the result.
///
/// Silent unless `verbose` is set or `RUST_LOG` says otherwise.
pub fn init_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .with(log_filter(verbose, directives.as_deref()))
        .init();
}

/// `RUST_LOG`-style `directives` win when present and valid; otherwise `verbose` picks debug
/// output for this crate or nothing at all.
pub fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "forex=debug" } else { "off" }))
}
