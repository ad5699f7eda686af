//! Log output on stderr, so stdout carries only the summary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset and no `-v` was given.
pub const DEFAULT_FILTER: &str = "info";

/// `-v` wins over `RUST_LOG`; otherwise `RUST_LOG`, else `info`.
pub fn filter_for(verbosity: u8, env: Option<&str>) -> String {
    match (verbosity, env) {
        (0, Some(env)) if !env.trim().is_empty() => env.to_string(),
        (0, _) => DEFAULT_FILTER.to_string(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn init(verbosity: u8) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_for(verbosity, env.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
