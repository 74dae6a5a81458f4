//! Logging setup for the simulator binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. `RUST_LOG` takes precedence over the level passed in.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level`
pub fn env_filter(level: &str) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_or(from_env.as_deref(), level)
}

fn filter_or(directives: Option<&str>, level: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

/// Install a global fmt subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(filter: EnvFilter) -> String {
        filter.to_string().to_lowercase()
    }

    #[test]
    fn test_level_used_without_directives() {
        assert_eq!(rendered(filter_or(None, "debug")), "debug");
    }

    #[test]
    fn test_directives_override_level() {
        assert_eq!(
            rendered(filter_or(Some("rtu_slave_sim=trace"), DEFAULT_LOG_LEVEL)),
            "rtu_slave_sim=trace"
        );
    }

    #[test]
    fn test_invalid_directives_fall_back_to_level() {
        assert_eq!(rendered(filter_or(Some("rtu_slave_sim=loud"), "warn")), "warn");
    }
}
