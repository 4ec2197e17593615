//! designgen CLI entry point
fn main() {
    // Structured logging to stderr, env-based filter defaulting to info; stdout carries the generated paths
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    designgen::cli::run();
}
