//! Analytical advection–diffusion footprint (Kormann & Meixner 2001).
//!
//! Power-law fits of wind speed `u(z) = U z^m` and eddy diffusivity
//! `K(z) = κ z^n` give a gamma-shaped along-wind profile
//!
//! ```text
//! Fx = ξ^μ / Γ(μ) · x^-(1+μ) · exp(-ξ / x)
//! ```
//!
//! and a Gaussian crosswind kernel whose spread is driven by the
//! plume-averaged wind `ū(x)`.

use ndarray::{Array2, Array3, Zip};
use statrs::function::gamma::gamma;

use super::{by_regime, gaussian_kernel, DispersionModel, ModelState, VON_KARMAN};
use crate::error::Result;
use crate::grid::ComputationalGrid;

#[derive(Clone, Debug)]
pub struct AnalyticalDiffusion {
    pub instrument_height: f64,
    pub roughness_length: f64,
}

impl AnalyticalDiffusion {
    pub fn new(instrument_height: f64, roughness_length: f64) -> Self {
        Self {
            instrument_height,
            roughness_length,
        }
    }
}

/// Shape and scale are only meaningful for positive `μ` and `r`.
#[inline]
fn admissible(mu: f64, r: f64) -> bool {
    mu > 0.0 && r > 0.0
}

impl DispersionModel for AnalyticalDiffusion {
    fn calc_parameters(&self, state: ModelState) -> Result<ModelState> {
        let z = self.instrument_height;
        let l = state.get("monin_obukhov_length")?;
        let zeta = state.get("zeta")?;
        let ustar = state.get("friction_velocity")?;
        let speed = state.get("wind_speed")?;

        // Similarity functions for heat and momentum.
        let phi_c = Zip::from(&l).and(&zeta).map_collect(|&l, &zeta| {
            by_regime(l, 1.0 + 5.0 * zeta, 1.0, (1.0 - 16.0 * zeta).powf(-0.5))
        });
        let phi_m = Zip::from(&l).and(&zeta).map_collect(|&l, &zeta| {
            by_regime(l, 1.0 + 5.0 * zeta, 1.0, (1.0 - 16.0 * zeta).powf(-0.25))
        });

        // Wind-profile exponent and diffusivity exponent.
        let m = Zip::from(&ustar)
            .and(&phi_m)
            .and(&speed)
            .map_collect(|&u, &phi, &s| u * phi / (VON_KARMAN * s));
        let n = Zip::from(&l).and(&zeta).map_collect(|&l, &zeta| {
            by_regime(
                l,
                1.0 / (1.0 + 5.0 * zeta),
                1.0,
                (1.0 - 24.0 * zeta) / (1.0 - 16.0 * zeta),
            )
        });

        let big_u = Zip::from(&speed)
            .and(&m)
            .map_collect(|&s, &m| s / z.powf(m));
        let kappa = Zip::from(&ustar)
            .and(&phi_c)
            .and(&n)
            .map_collect(|&u, &phi, &n| VON_KARMAN * u * z / (phi * z.powf(n)));
        let r = Zip::from(&m).and(&n).map_collect(|&m, &n| 2.0 + m - n);
        let xi = Zip::from(&big_u)
            .and(&r)
            .and(&kappa)
            .map_collect(|&u, &r, &k| (u * z.powf(r)) / (k * r * r));
        let mu = Zip::from(&m).and(&r).map_collect(|&m, &r| (1.0 + m) / r);

        for (t, (&mu_t, &r_t)) in mu.iter().zip(r.iter()).enumerate() {
            if !admissible(mu_t, r_t) {
                tracing::warn!(
                    timestep = t,
                    mu = mu_t,
                    r = r_t,
                    "non-positive footprint shape parameter, timestep will be undefined"
                );
            }
        }

        Ok(state
            .with("phi_c", phi_c)
            .with("phi_m", phi_m)
            .with("m", m)
            .with("n", n)
            .with("U", big_u)
            .with("kappa", kappa)
            .with("r", r)
            .with("xi", xi)
            .with("mu", mu))
    }

    fn calc_fx(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array2<f64>> {
        let xi = state.get("xi")?;
        let mu = state.get("mu")?;
        let r = state.get("r")?;
        let norm = Zip::from(&xi).and(&mu).and(&r).map_collect(|&xi, &mu, &r| {
            if admissible(mu, r) {
                (1.0 / gamma(mu)) * xi.powf(mu)
            } else {
                f64::NAN
            }
        });

        let mut fx = Array2::<f64>::zeros((grid.x.len(), xi.len()));
        Zip::indexed(&mut fx).par_for_each(|(i, t), out| {
            let x = grid.x[i];
            *out = norm[t] / x.powf(1.0 + mu[t]) * (-xi[t] / x).exp();
        });
        Ok(fx)
    }

    fn calc_dxy(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array3<f64>> {
        let variance = state.get("crosswind_variance")?;
        let kappa = state.get("kappa")?;
        let big_u = state.get("U")?;
        let m = state.get("m")?;
        let r = state.get("r")?;
        let mu = state.get("mu")?;

        // ū(x) = Γ(μ)/Γ(1/r) · (κ r² / U)^(m/r) · U · x^(m/r)
        let ubar_coef = Zip::from(&mu)
            .and(&r)
            .and(&kappa)
            .and(&big_u)
            .and(&m)
            .map_collect(|&mu, &r, &k, &u, &m| {
                if admissible(mu, r) {
                    gamma(mu) / gamma(1.0 / r) * (k * r * r / u).powf(m / r)
                } else {
                    f64::NAN
                }
            });
        let sigma_v = variance.mapv(f64::sqrt);

        let (nx, ny) = grid.shape();
        let mut dxy = Array3::<f64>::zeros((nx, ny, variance.len()));
        Zip::indexed(&mut dxy).par_for_each(|(i, j, t), out| {
            let x = grid.xx[[i, j]];
            let u_bar = ubar_coef[t] * (big_u[t] * x.powf(m[t] / r[t]));
            let sigma_y = sigma_v[t] * x / u_bar;
            *out = gaussian_kernel(grid.yy[[i, j]], sigma_y);
        });
        Ok(dxy)
    }
}
