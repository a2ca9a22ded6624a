//! Flux footprint fields for eddy-covariance towers.
//!
//! A time series of near-surface turbulence measurements is turned into a
//! stack of 2-D source-area densities, each rotated to its wind direction and
//! resampled onto one north-aligned grid.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod config;
pub mod error;
pub mod grid;
pub mod kdtree;
pub mod logging;
pub mod measurements;
pub mod models;
pub mod pipeline;
pub mod resample;
pub mod rotate;
pub mod stability;

pub use config::{FootprintConfig, Method, Workers};
pub use error::{FootprintError, Result};
pub use measurements::MeasurementSeries;
pub use pipeline::{compute_footprint_pure, FootprintStack};

#[cfg(feature = "python")]
#[pymodule]
fn footprint_rs(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    register_footprint_module(py_module)?;
    register_stability_module(py_module)?;
    register_logging_module(py_module)?;

    py_module.add("__doc__", "Flux footprint models implemented in Rust.")?;

    Ok(())
}

#[cfg(feature = "python")]
fn register_footprint_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "footprint")?;
    submodule.add("__doc__", "Footprint stacks on a north-aligned template grid.")?;
    submodule.add_class::<pipeline::python::FootprintResult>()?;
    submodule.add_function(wrap_pyfunction!(
        pipeline::python::compute_footprint,
        &submodule
    )?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_stability_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "stability")?;
    submodule.add("__doc__", "Monin-Obukhov length from flux measurements.")?;
    submodule.add_function(wrap_pyfunction!(stability::python::obukhov_length, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

#[cfg(feature = "python")]
fn register_logging_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    let submodule = PyModule::new(py_module.py(), "logging")?;
    submodule.add("__doc__", "Log output control.")?;
    submodule.add_function(wrap_pyfunction!(logging::python::init_logging, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}
