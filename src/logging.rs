//! Tracing subscriber setup

use crate::config::schema::GeneralConfig;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for the `offcache` target.
///
/// `RUST_LOG`, when set, overrides the configured level. Returns `false` if
/// a subscriber was already installed.
pub fn init(config: &GeneralConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("offcache={}", config.log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    };
    result.is_ok()
}
