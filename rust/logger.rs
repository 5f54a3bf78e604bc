use std::env;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries command output.
///
/// `RUST_LOG` wins when set. Otherwise each `-v` raises the level above
/// `LOG_LEVEL` (default warn).
pub fn init_logging(verbosity: u8) {
    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => EnvFilter::new(level_name(verbosity, env::var("LOG_LEVEL").ok())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn level_name(verbosity: u8, configured: Option<String>) -> String {
    match verbosity {
        0 => configured
            .map(|level| level.to_lowercase())
            .unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
