use tracing_subscriber::EnvFilter;

/// Initialises logging to standard error, keeping it clear of the report on standard output.
/// Defaults to `warn` so dropped-record diagnostics always show; `RUST_LOG` overrides the level.
pub fn enable_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}
