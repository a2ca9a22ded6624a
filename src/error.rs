//! Error type shared by every stage of the footprint pipeline.
//!
//! Only input-shape and configuration problems are errors. Numerically
//! degenerate measurements are carried through the grids as `NaN` cells.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("measurement series is empty")]
    EmptySeries,

    #[error("column `{field}` has {found} entries, expected {expected} (length of `time`)")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("duplicate time key {0}")]
    DuplicateTime(i64),

    #[error(
        "invalid domain: domain_length={domain_length}, resolution={resolution} \
         (both must be positive and domain_length / resolution >= 1)"
    )]
    InvalidDomain { domain_length: f64, resolution: f64 },

    #[error("unknown footprint method `{0}` (expected `LogProfile` or `AnalyticalDiffusion`)")]
    UnknownMethod(String),

    #[error("invalid worker count {0} (use a positive count or -1 for all cores)")]
    InvalidWorkers(i64),

    #[error("model state has no field `{0}`")]
    MissingField(&'static str),

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, FootprintError>;

#[cfg(feature = "python")]
impl From<FootprintError> for pyo3::PyErr {
    fn from(err: FootprintError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
