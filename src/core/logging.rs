//! Diagnostic logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "TENDER_LOG";

/// Install the stderr subscriber
///
/// `TENDER_LOG` takes precedence; otherwise `warn`, or `debug` when verbose.
/// Calling this more than once is a no-op.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
