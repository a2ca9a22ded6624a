//! Opt-in log output for the pipeline's `tracing` events.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber writing to stderr. `RUST_LOG` takes
/// precedence over `level`. Returns `false` if a global subscriber was
/// already installed.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(feature = "python")]
pub(crate) mod python {
    use pyo3::prelude::*;

    /// Route footprint log events to stderr.
    ///
    /// Args:
    ///     level: Filter such as "info" or "footprint_rs=debug". Ignored when RUST_LOG is set.
    ///
    /// Returns:
    ///     True if logging was installed by this call.
    #[pyfunction]
    #[pyo3(signature = (level="info"))]
    pub fn init_logging(level: &str) -> bool {
        super::init_logging(level)
    }
}
