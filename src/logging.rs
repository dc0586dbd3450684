//! Logging setup for the command-line binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "salesbeam=info";

/// Install a stdout `tracing` subscriber filtered by `RUST_LOG`.
///
/// `verbose` raises the crate's default level to `debug`. Calling this twice
/// is harmless; the second subscriber is ignored.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "salesbeam=debug" } else { DEFAULT_DIRECTIVE };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
