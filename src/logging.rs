//! Logging setup. Stdout carries the protocol, so logs go to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when neither `RUST_LOG` nor a level flag is given.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`, else `level`, else [`DEFAULT_FILTER`].
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init_logging(level: Option<&str>) -> Result<(), anyhow::Error> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_falls_back() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(env_filter(Some("deckmill=loud")).to_string(), DEFAULT_FILTER);
        assert_eq!(env_filter(Some("debug")).to_string(), "debug");
        assert_eq!(env_filter(None).to_string(), DEFAULT_FILTER);
    }
}
