// Logging setup
// Everything logs through `tracing`; a stderr subscriber is installed once.
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log filter
pub const LOG_ENV: &str = "MEDIATRANSPORT4J_LOG";

static INIT: Once = Once::new();

/// Install the stderr subscriber. Leaves an already-installed global
/// subscriber in place.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    });
}
