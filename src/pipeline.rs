//! Footprint pipeline: model → rotate → resample, stacked over time.
//!
//! The dispersion model is evaluated once for the whole series (parameters
//! are per-timestep scalars broadcast over the shared grid). Rotation and
//! resampling then run timestep by timestep, since every wind direction
//! produces a differently scattered point set.
//!
//! Intermediate fields stay as ndarray arrays; only the final stack leaves
//! the crate.

use ndarray::{Array1, Array3, ArrayView2, Axis};
use ndarray_stats::QuantileExt;

use crate::config::FootprintConfig;
use crate::error::Result;
use crate::grid::{build_grid, build_template};
use crate::measurements::MeasurementSeries;
use crate::models::FootprintModel;
use crate::resample::{Resampler, DEFAULT_NEIGHBORS};
use crate::rotate::rotate;

// ── Output ──────────────────────────────────────────────────────────────────

/// Footprints on the template grid, one `[x, y]` slice per timestep.
#[derive(Clone, Debug)]
pub struct FootprintStack {
    /// Northward template axis.
    pub x: Array1<f64>,
    /// Eastward template axis.
    pub y: Array1<f64>,
    pub time: Vec<i64>,
    /// `[x, y, time]`
    pub data: Array3<f64>,
}

impl FootprintStack {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn slice(&self, t: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), t)
    }

    /// Area represented by one template cell (m²).
    pub fn cell_area(&self) -> f64 {
        axis_step(&self.x) * axis_step(&self.y)
    }

    /// Template coordinates `(x, y)` of the largest finite value of slice `t`,
    /// or `None` when the slice holds no finite value.
    pub fn peak_location(&self, t: usize) -> Option<(f64, f64)> {
        let (i, j) = self.slice(t).argmax_skipnan().ok()?;
        Some((self.x[i], self.y[j]))
    }
}

fn axis_step(axis: &Array1<f64>) -> f64 {
    if axis.len() < 2 {
        return 0.0;
    }
    (axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64
}

// ── Pipeline ────────────────────────────────────────────────────────────────

/// Compute one north-aligned footprint per measurement, in input order.
pub fn compute_footprint_pure(
    series: &MeasurementSeries,
    config: &FootprintConfig,
) -> Result<FootprintStack> {
    config.validate()?;
    let model = FootprintModel::from_config(config);
    let resampler = Resampler::new(DEFAULT_NEIGHBORS, config.workers)?;

    let grid = build_grid(config.domain_length, config.resolution, series.time())?;
    let template = build_template(config.domain_length, config.resolution)?;
    tracing::info!(
        method = %model.method(),
        timesteps = series.len(),
        grid = ?grid.shape(),
        template = ?template.shape(),
        threads = resampler.threads(),
        "computing footprints"
    );

    let field = model.evaluate(series, &grid)?;

    let (nx, ny) = template.shape();
    let mut data = Array3::<f64>::zeros((nx, ny, series.len()));
    for (t, (&key, &wind_direction)) in series
        .time()
        .iter()
        .zip(series.wind_direction())
        .enumerate()
    {
        let rotated = rotate(&grid, field.fxy.index_axis(Axis(2), t), wind_direction);
        let regridded = resampler.regrid(&rotated, &template);

        let non_finite = regridded.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            tracing::warn!(
                time = key,
                cells = non_finite,
                "footprint contains non-finite values"
            );
        }
        tracing::debug!(
            time = key,
            wind_direction,
            peak = *regridded.max_skipnan(),
            "timestep resampled"
        );

        data.index_axis_mut(Axis(2), t).assign(&regridded);
    }

    tracing::info!(timesteps = series.len(), "footprints complete");
    Ok(FootprintStack {
        x: template.x,
        y: template.y,
        time: series.time().to_vec(),
        data,
    })
}

// ── Python bindings ─────────────────────────────────────────────────────────

#[cfg(feature = "python")]
pub(crate) mod python {
    use numpy::{IntoPyArray, PyArray1, PyArray3, PyReadonlyArray1};
    use pyo3::prelude::*;

    use super::compute_footprint_pure;
    use crate::config::{FootprintConfig, Method, Workers};
    use crate::measurements::MeasurementSeries;

    /// Footprint stack returned to Python.
    #[pyclass]
    pub struct FootprintResult {
        /// `[x, y, time]` footprint densities (m⁻²).
        #[pyo3(get)]
        pub footprint: Py<PyArray3<f64>>,
        /// Northward template coordinate (m).
        #[pyo3(get)]
        pub x: Py<PyArray1<f64>>,
        /// Eastward template coordinate (m).
        #[pyo3(get)]
        pub y: Py<PyArray1<f64>>,
        #[pyo3(get)]
        pub time: Py<PyArray1<i64>>,
    }

    /// Compute north-aligned flux footprints for a measurement series.
    ///
    /// Args:
    ///     air_pressure, air_temperature, friction_velocity, wind_speed,
    ///     crosswind_variance, wind_direction, monin_obukhov_length:
    ///         1-D float arrays, one entry per timestep.
    ///     time: 1-D int64 array of unique time keys (e.g. datetime64[ns] viewed as int64).
    ///     instrument_height: Measurement height (m).
    ///     roughness_length: Aerodynamic roughness length (m).
    ///     domain_length: Upwind extent of the model grid (m).
    ///     resolution: Grid spacing (m).
    ///     workers: Search threads, -1 for all cores.
    ///     method: "LogProfile" or "AnalyticalDiffusion".
    ///
    /// Returns:
    ///     FootprintResult with the (x, y, time) stack and its axes.
    #[pyfunction]
    #[pyo3(signature = (
        *, air_pressure, air_temperature, friction_velocity, wind_speed,
        crosswind_variance, wind_direction, monin_obukhov_length, time,
        instrument_height, roughness_length,
        domain_length=1000.0, resolution=5.0, workers=1, method="LogProfile",
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn compute_footprint<'py>(
        py: Python<'py>,
        air_pressure: PyReadonlyArray1<'py, f64>,
        air_temperature: PyReadonlyArray1<'py, f64>,
        friction_velocity: PyReadonlyArray1<'py, f64>,
        wind_speed: PyReadonlyArray1<'py, f64>,
        crosswind_variance: PyReadonlyArray1<'py, f64>,
        wind_direction: PyReadonlyArray1<'py, f64>,
        monin_obukhov_length: PyReadonlyArray1<'py, f64>,
        time: PyReadonlyArray1<'py, i64>,
        instrument_height: f64,
        roughness_length: f64,
        domain_length: f64,
        resolution: f64,
        workers: i64,
        method: &str,
    ) -> PyResult<FootprintResult> {
        let config = FootprintConfig::new(instrument_height, roughness_length)
            .with_domain(domain_length, resolution)
            .with_workers(Workers::from_hint(workers)?)
            .with_method(method.parse::<Method>()?);
        config.validate()?;

        let series = MeasurementSeries::new(
            air_pressure.as_array().to_owned(),
            air_temperature.as_array().to_owned(),
            friction_velocity.as_array().to_owned(),
            wind_speed.as_array().to_owned(),
            crosswind_variance.as_array().to_owned(),
            wind_direction.as_array().to_owned(),
            monin_obukhov_length.as_array().to_owned(),
            time.as_array().to_vec(),
        )?;

        let stack = py.allow_threads(|| compute_footprint_pure(&series, &config))?;

        Ok(FootprintResult {
            footprint: stack.data.into_pyarray(py).unbind(),
            x: stack.x.into_pyarray(py).unbind(),
            y: stack.y.into_pyarray(py).unbind(),
            time: stack.time.into_pyarray(py).unbind(),
        })
    }
}
