//! stderr logging setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn default_filter(debug: bool) -> &'static str {
    if debug { "songinfo=debug" } else { "songinfo=info" }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logger(debug: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_follows_debug_flag() {
        assert_eq!(default_filter(false), "songinfo=info");
        assert_eq!(default_filter(true), "songinfo=debug");
    }
}
