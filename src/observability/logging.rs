//! Logging initialization.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber filtered at the configured verbosity.
///
/// The `RUST_LOG` environment variable wins when set. Best-effort: when the
/// embedding host already installed a subscriber, the existing one is kept.
pub fn init(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive_for(level)));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn directive_for(level: &str) -> String {
    match level {
        "silent" => "botgate=off".to_string(),
        level => format!("botgate={level}"),
    }
}
