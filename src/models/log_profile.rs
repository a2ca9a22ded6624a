//! Log-wind-profile footprint (Hsieh, Katul & Chi 2000).
//!
//! Along-wind: `Fx = a / (κ² x²) · exp(-a / (κ² x))` with
//! `a = D · zu^P · |L|^(1-P)`.
//! Crosswind: Gaussian with `σy = 0.3 z0 √σv² / u* · (x / z0)^0.86`.

use ndarray::{Array1, Array2, Array3, Zip};

use super::{gaussian_kernel, DispersionModel, ModelState, VON_KARMAN};
use crate::error::Result;
use crate::grid::ComputationalGrid;

/// Threshold on `zu / L` separating the three stability regimes.
const NEUTRAL_BAND: f64 = 0.02;

/// `(D, P)` similarity constants for stable, near-neutral and unstable air.
const STABLE_DP: (f64, f64) = (2.44, 1.33);
const NEUTRAL_DP: (f64, f64) = (0.97, 1.0);
const UNSTABLE_DP: (f64, f64) = (0.28, 0.59);

const SIGMA_Y_COEF: f64 = 0.3;
const SIGMA_Y_EXPONENT: f64 = 0.86;

#[derive(Clone, Debug)]
pub struct LogProfile {
    pub instrument_height: f64,
    pub roughness_length: f64,
}

impl LogProfile {
    pub fn new(instrument_height: f64, roughness_length: f64) -> Self {
        Self {
            instrument_height,
            roughness_length,
        }
    }

    /// Effective measurement height from the integrated log-law profile.
    pub fn effective_height(&self) -> f64 {
        let (z, z0) = (self.instrument_height, self.roughness_length);
        z * ((z / z0).ln() - 1.0 + z0 / z)
    }
}

/// Similarity constants for a given `zu / L`.
#[inline]
fn similarity_constants(zeta_h: f64) -> (f64, f64) {
    if zeta_h < -NEUTRAL_BAND {
        UNSTABLE_DP
    } else if zeta_h > NEUTRAL_BAND {
        STABLE_DP
    } else {
        NEUTRAL_DP
    }
}

impl DispersionModel for LogProfile {
    fn calc_parameters(&self, state: ModelState) -> Result<ModelState> {
        let zu = self.effective_height();
        let zeta_h = state.get("monin_obukhov_length")?.mapv(|l| zu / l);
        let d = zeta_h.mapv(|z| similarity_constants(z).0);
        let p = zeta_h.mapv(|z| similarity_constants(z).1);

        for (t, &u) in state.get("friction_velocity")?.iter().enumerate() {
            if u.is_nan() || u <= 0.0 {
                tracing::warn!(
                    timestep = t,
                    friction_velocity = u,
                    "non-positive friction velocity, crosswind kernel undefined"
                );
            }
        }

        let n = zeta_h.len();
        Ok(state
            .with("zu", Array1::from_elem(n, zu))
            .with("zeta_H", zeta_h)
            .with("D", d)
            .with("P", p))
    }

    fn calc_fx(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array2<f64>> {
        let zu = state.get("zu")?;
        let l = state.get("monin_obukhov_length")?;
        let d = state.get("D")?;
        let p = state.get("P")?;

        let k2 = VON_KARMAN * VON_KARMAN;
        let mut fx = Array2::<f64>::zeros((grid.x.len(), l.len()));
        Zip::indexed(&mut fx).par_for_each(|(i, t), out| {
            let x = grid.x[i];
            let zu_p = zu[t].powf(p[t]);
            let l_p = l[t].abs().powf(1.0 - p[t]);
            *out = (1.0 / (k2 * x * x))
                * d[t]
                * zu_p
                * l_p
                * ((-d[t] * zu_p * l_p) / (k2 * x)).exp();
        });
        Ok(fx)
    }

    fn calc_dxy(&self, grid: &ComputationalGrid, state: &ModelState) -> Result<Array3<f64>> {
        let ustar = state.get("friction_velocity")?;
        let variance = state.get("crosswind_variance")?;
        let z0 = self.roughness_length;

        let scale: Array1<f64> = Zip::from(&ustar)
            .and(&variance)
            .map_collect(|&u, &v| SIGMA_Y_COEF * z0 * v.sqrt() / u);

        let (nx, ny) = grid.shape();
        let mut dxy = Array3::<f64>::zeros((nx, ny, scale.len()));
        Zip::indexed(&mut dxy).par_for_each(|(i, j, t), out| {
            let sigma_y = scale[t] * (grid.xx[[i, j]] / z0).powf(SIGMA_Y_EXPONENT);
            *out = gaussian_kernel(grid.yy[[i, j]], sigma_y);
        });
        Ok(dxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid;
    use crate::measurements::tests::series_of;

    fn model() -> LogProfile {
        LogProfile::new(2.5, 0.0206)
    }

    #[test]
    fn test_effective_height() {
        // 2.5 * (ln(2.5 / 0.0206) - 1 + 0.0206 / 2.5)
        let zu = model().effective_height();
        assert!((zu - 9.5175).abs() < 1e-3, "zu = {zu}");
    }

    #[test]
    fn test_regime_split() {
        let series = series_of(&[
            (0.3, 3.0, 1.0, 0.0, 50.0),
            (0.3, 3.0, 1.0, 0.0, -50.0),
            (0.3, 3.0, 1.0, 0.0, 1.0e5),
        ]);
        let state = model().calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let d = state.get("D").unwrap();
        let p = state.get("P").unwrap();
        assert_eq!((d[0], p[0]), STABLE_DP);
        assert_eq!((d[1], p[1]), UNSTABLE_DP);
        assert_eq!((d[2], p[2]), NEUTRAL_DP);
        assert!(state.get("zeta_H").unwrap()[0] > NEUTRAL_BAND);
    }

    #[test]
    fn test_fx_integrates_to_one() {
        let series = series_of(&[(0.3, 3.0, 1.0, 0.0, -50.0), (0.3, 3.0, 1.0, 0.0, 200.0)]);
        let grid = build_grid(5000.0, 1.0, series.time()).unwrap();
        let m = model();
        let state = m.calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let fx = m.calc_fx(&grid, &state).unwrap();
        let dx = grid.x[1] - grid.x[0];
        for t in 0..2 {
            let total: f64 = fx.column(t).sum() * dx;
            assert!(total > 0.8 && total < 1.01, "t={t} total={total}");
        }
    }

    #[test]
    fn test_dxy_integrates_to_one_across_wind() {
        let series = series_of(&[(0.3, 3.0, 1.0, 0.0, -50.0)]);
        let grid = build_grid(1000.0, 5.0, series.time()).unwrap();
        let m = model();
        let state = m.calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let dxy = m.calc_dxy(&grid, &state).unwrap();
        let dy = grid.y[1] - grid.y[0];
        // Near field where the plume is fully inside the crosswind extent.
        for i in [2, 10, 40] {
            let total: f64 = (0..grid.y.len()).map(|j| dxy[[i, j, 0]]).sum::<f64>() * dy;
            assert!((total - 1.0).abs() < 0.05, "x={} total={total}", grid.x[i]);
        }
    }

    #[test]
    fn test_non_positive_friction_velocity_is_nan() {
        let series = series_of(&[(0.0, 3.0, 1.0, 0.0, -50.0), (-0.2, 3.0, 1.0, 0.0, -50.0)]);
        let grid = build_grid(100.0, 10.0, series.time()).unwrap();
        let m = model();
        let state = m.calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let dxy = m.calc_dxy(&grid, &state).unwrap();
        assert!(dxy.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_peak_moves_downwind_with_stability() {
        let series = series_of(&[(0.3, 3.0, 1.0, 0.0, 200.0), (0.3, 3.0, 1.0, 0.0, 10.0)]);
        let grid = build_grid(2000.0, 1.0, series.time()).unwrap();
        let m = model();
        let state = m.calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let fx = m.calc_fx(&grid, &state).unwrap();
        let argmax = |t: usize| {
            let col = fx.column(t);
            (0..col.len()).fold(0, |best, i| if col[i] > col[best] { i } else { best })
        };
        assert!(argmax(1) > argmax(0));
    }

    #[test]
    fn test_profile_is_unimodal_in_every_regime() {
        let series = series_of(&[
            (0.3, 3.0, 1.0, 0.0, 50.0),
            (0.3, 3.0, 1.0, 0.0, 1.0e5),
            (0.3, 3.0, 1.0, 0.0, -50.0),
        ]);
        let grid = build_grid(2000.0, 1.0, series.time()).unwrap();
        let m = model();
        let state = m.calc_parameters(ModelState::seed(&series, 2.5)).unwrap();
        let fx = m.calc_fx(&grid, &state).unwrap();

        for t in 0..3 {
            let col = fx.column(t);
            let rises = col.windows(2).into_iter().filter(|w| w[1] > w[0]).count();
            let peak = (0..col.len()).fold(0, |best, i| if col[i] > col[best] { i } else { best });
            assert!(peak > 0 && peak < col.len() - 1, "t={t} peak={peak}");
            assert_eq!(rises, peak, "t={t}");
        }
    }
}
