use tracing_subscriber::EnvFilter;

use crate::error::{ConversionError, Result};

/// Maps `-q`/`-v` flags onto a default filter directive.
pub fn default_directive(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Installs the global stderr subscriber. `RUST_LOG` takes precedence over the
/// flag-derived level.
pub fn init_logging(quiet: bool, verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| ConversionError::Logging(error.to_string()))
}
