//! Dispersion models.
//!
//! A model turns the measurement series into an along-wind flux profile
//! `Fx[x, t]` and a crosswind kernel `Dxy[x, y, t]`; their product is the
//! raw footprint `Fxy` in the computational frame. Every variant runs the
//! same sequence: parameters → Fx → Dxy → Fxy.
//!
//! Parameters are per-timestep scalars kept in a [`ModelState`]. The whole
//! time series is evaluated in one pass and broadcast over the shared grid.

mod analytical_diffusion;
mod log_profile;

pub use analytical_diffusion::AnalyticalDiffusion;
pub use log_profile::LogProfile;

use std::collections::BTreeMap;
use std::f64::consts::PI;

use ndarray::{Array1, Array2, Array3, ArrayView1, Axis, Zip};

use crate::config::{FootprintConfig, Method};
use crate::error::{FootprintError, Result};
use crate::grid::ComputationalGrid;
use crate::measurements::MeasurementSeries;

/// von Kármán constant.
pub const VON_KARMAN: f64 = 0.41;

/// Named per-timestep scalar fields derived during parameter estimation.
#[derive(Clone, Debug, Default)]
pub struct ModelState {
    fields: BTreeMap<&'static str, Array1<f64>>,
}

impl ModelState {
    /// Seed a state with the measurement columns and the stability parameter
    /// `zeta = instrument_height / L`.
    pub fn seed(series: &MeasurementSeries, instrument_height: f64) -> Self {
        let zeta = series.monin_obukhov_length().mapv(|l| instrument_height / l);
        Self::default()
            .with("friction_velocity", series.friction_velocity().clone())
            .with("wind_speed", series.wind_speed().clone())
            .with("crosswind_variance", series.crosswind_variance().clone())
            .with("monin_obukhov_length", series.monin_obukhov_length().clone())
            .with("zeta", zeta)
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, values: Array1<f64>) -> Self {
        self.fields.insert(name, values);
        self
    }

    pub fn get(&self, name: &'static str) -> Result<ArrayView1<'_, f64>> {
        self.fields
            .get(name)
            .map(|a| a.view())
            .ok_or(FootprintError::MissingField(name))
    }
}

/// Footprint arrays for every timestep, in the computational frame.
#[derive(Clone, Debug)]
pub struct FootprintField {
    /// `[x, time]`
    pub fx: Array2<f64>,
    /// `[x, y, time]`
    pub dxy: Array3<f64>,
    /// `[x, y, time]`
    pub fxy: Array3<f64>,
}

pub trait DispersionModel {
    /// Derive this variant's parameters from a seeded state.
    fn calc_parameters(&self, state: ModelState) -> Result<ModelState>;

    /// Along-wind flux profile, shape `[x, time]`.
    fn calc_fx(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array2<f64>>;

    /// Crosswind dispersion kernel, shape `[x, y, time]`.
    fn calc_dxy(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array3<f64>>;
}

/// The closed set of dispersion variants.
#[derive(Clone, Debug)]
pub enum FootprintModel {
    LogProfile(LogProfile),
    AnalyticalDiffusion(AnalyticalDiffusion),
}

impl FootprintModel {
    pub fn from_config(config: &FootprintConfig) -> Self {
        let (z, z0) = (config.instrument_height, config.roughness_length);
        match config.method {
            Method::LogProfile => FootprintModel::LogProfile(LogProfile::new(z, z0)),
            Method::AnalyticalDiffusion => {
                FootprintModel::AnalyticalDiffusion(AnalyticalDiffusion::new(z, z0))
            }
        }
    }

    pub fn method(&self) -> Method {
        match self {
            FootprintModel::LogProfile(_) => Method::LogProfile,
            FootprintModel::AnalyticalDiffusion(_) => Method::AnalyticalDiffusion,
        }
    }

    fn instrument_height(&self) -> f64 {
        match self {
            FootprintModel::LogProfile(m) => m.instrument_height,
            FootprintModel::AnalyticalDiffusion(m) => m.instrument_height,
        }
    }

    fn dispersion(&self) -> &dyn DispersionModel {
        match self {
            FootprintModel::LogProfile(m) => m,
            FootprintModel::AnalyticalDiffusion(m) => m,
        }
    }

    /// Run parameters → Fx → Dxy → Fxy for every timestep of `series`.
    pub fn evaluate(
        &self,
        series: &MeasurementSeries,
        grid: &ComputationalGrid,
    ) -> Result<FootprintField> {
        let model = self.dispersion();
        let state = model.calc_parameters(ModelState::seed(series, self.instrument_height()))?;
        let fx = model.calc_fx(grid, &state)?;
        let dxy = model.calc_dxy(grid, &state)?;
        let fxy = calc_fxy(&fx, &dxy);
        Ok(FootprintField { fx, dxy, fxy })
    }
}

/// Broadcast `Fx[x, t]` across the crosswind axis of `Dxy[x, y, t]`.
pub fn calc_fxy(fx: &Array2<f64>, dxy: &Array3<f64>) -> Array3<f64> {
    let fx_b = fx.view().insert_axis(Axis(1));
    let mut fxy = dxy.clone();
    Zip::from(&mut fxy)
        .and_broadcast(fx_b)
        .par_for_each(|v, &f| *v *= f);
    fxy
}

/// Zero-mean Gaussian density. A spread that is not a positive finite
/// number has no meaningful kernel, so the cell becomes `NaN`.
#[inline]
pub(crate) fn gaussian_kernel(y: f64, sigma_y: f64) -> f64 {
    if !(sigma_y > 0.0 && sigma_y.is_finite()) {
        return f64::NAN;
    }
    (1.0 / ((2.0 * PI).sqrt() * sigma_y)) * (-0.5 * (y / sigma_y).powi(2)).exp()
}

/// Pick one of three values by the sign of `v`: stable (`v > 0`),
/// neutral (`v == 0` or `NaN`), unstable (`v < 0`).
#[inline]
pub(crate) fn by_regime(v: f64, stable: f64, neutral: f64, unstable: f64) -> f64 {
    if v > 0.0 {
        stable
    } else if v < 0.0 {
        unstable
    } else {
        neutral
    }
}
