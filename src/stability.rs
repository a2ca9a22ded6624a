//! Monin–Obukhov length from bulk flux measurements.
//!
//! The footprint models take `L` as an input. This is the usual eddy-covariance
//! derivation for stations that record sensible heat flux rather than `L`.

use ndarray::{Array1, ArrayView1, Zip};

use crate::models::VON_KARMAN;

/// Specific heat of air at constant pressure (J kg⁻¹ K⁻¹).
const CP_AIR: f64 = 1003.0;
/// Specific gas constant for dry air (J kg⁻¹ K⁻¹).
const R_DRY_AIR: f64 = 287.0;
const GRAVITY: f64 = 9.8;
const KELVIN_OFFSET: f64 = 273.0;

/// `L = -ρ cp u*³ T / (κ g H)` with `ρ = p / (R T)`.
///
/// - `air_pressure`: Pa
/// - `air_temperature`: °C
/// - `friction_velocity`: m s⁻¹
/// - `sensible_heat_flux`: W m⁻²
///
/// Zero heat flux gives an infinite length (neutral).
#[inline]
pub fn obukhov_length(
    air_pressure: f64,
    air_temperature: f64,
    friction_velocity: f64,
    sensible_heat_flux: f64,
) -> f64 {
    let t_k = air_temperature + KELVIN_OFFSET;
    let rho = air_pressure / (R_DRY_AIR * t_k);
    -(rho * CP_AIR * friction_velocity.powi(3) * t_k) / (VON_KARMAN * GRAVITY * sensible_heat_flux)
}

/// [`obukhov_length`] applied element-wise over a series.
pub fn obukhov_length_series(
    air_pressure: ArrayView1<f64>,
    air_temperature: ArrayView1<f64>,
    friction_velocity: ArrayView1<f64>,
    sensible_heat_flux: ArrayView1<f64>,
) -> Array1<f64> {
    Zip::from(&air_pressure)
        .and(&air_temperature)
        .and(&friction_velocity)
        .and(&sensible_heat_flux)
        .map_collect(|&p, &t, &u, &h| obukhov_length(p, t, u, h))
}

#[cfg(feature = "python")]
pub(crate) mod python {
    use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
    use pyo3::prelude::*;

    /// Monin–Obukhov length (m) for each timestep.
    ///
    /// Args:
    ///     air_pressure: Pa.
    ///     air_temperature: °C.
    ///     friction_velocity: m/s.
    ///     sensible_heat_flux: W/m².
    ///
    /// Returns:
    ///     1-D array of L, negative when unstable.
    #[pyfunction]
    pub fn obukhov_length<'py>(
        py: Python<'py>,
        air_pressure: PyReadonlyArray1<'py, f64>,
        air_temperature: PyReadonlyArray1<'py, f64>,
        friction_velocity: PyReadonlyArray1<'py, f64>,
        sensible_heat_flux: PyReadonlyArray1<'py, f64>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let p = air_pressure.as_array();
        let t = air_temperature.as_array();
        let u = friction_velocity.as_array();
        let h = sensible_heat_flux.as_array();
        for (name, len) in [
            ("air_temperature", t.len()),
            ("friction_velocity", u.len()),
            ("sensible_heat_flux", h.len()),
        ] {
            if len != p.len() {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "{name} has {len} entries, expected {}",
                    p.len()
                )));
            }
        }
        let out = super::obukhov_length_series(p, t, u, h);
        Ok(out.into_pyarray(py))
    }
}
