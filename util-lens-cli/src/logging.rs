use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise stderr logging. `RUST_LOG` wins over the configured level;
/// terminals get compact text, anything else gets one JSON object per event.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if io::stderr().is_terminal() {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .flatten_event(true)
            .init();
    }
}
