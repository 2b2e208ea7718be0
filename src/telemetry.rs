//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the filter is `info`, or `debug`
/// when `verbose` is set. Returns `false` if a global subscriber was already
/// installed.
pub fn init_tracing(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn second_install_is_reported() {
        // Whichever test installs first, a later install must be refused.
        init_tracing(false);
        assert!(!init_tracing(true));
    }
}
