//! Computational and template grids.
//!
//! The computational grid is the model's native frame: `x` runs downwind
//! from the sensor (strictly positive), `y` across the wind. The template
//! grid is the fixed, north-aligned output frame every timestep is resampled
//! onto. Both are built once per run and shared read-only.
//!
//! All 2-D arrays are indexed `[x, y]`.

use ndarray::{Array1, Array2};

use crate::config::validate_domain;
use crate::error::Result;

/// Native downwind/crosswind grid shared by every timestep of a run.
#[derive(Clone, Debug)]
pub struct ComputationalGrid {
    pub domain_length: f64,
    pub resolution: f64,
    /// Downwind distance, `linspace(1, domain_length, n)`.
    pub x: Array1<f64>,
    /// Crosswind offset, symmetric about zero over `[-domain_length/2, domain_length/2]`.
    pub y: Array1<f64>,
    pub xx: Array2<f64>,
    pub yy: Array2<f64>,
    pub time: Vec<i64>,
}

impl ComputationalGrid {
    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    pub fn n_time(&self) -> usize {
        self.time.len()
    }
}

/// Fixed output grid. `x` points north, `y` points east.
#[derive(Clone, Debug)]
pub struct TemplateGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub xx: Array2<f64>,
    /// Flattened `(x, y)` pairs, row `i * ny + j` is `(x[i], y[j])`.
    pub query_points: Array2<f64>,
}

impl TemplateGrid {
    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }
}

/// Number of samples per computational axis.
#[inline]
pub fn axis_len(domain_length: f64, resolution: f64) -> usize {
    (domain_length / resolution).floor() as usize
}

/// `n` evenly spaced samples over `[-half, half]`, exactly antisymmetric.
fn symmetric_axis(half: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_elem(1, -half);
    }
    let span = (n - 1) as f64;
    Array1::from_shape_fn(n, |i| {
        let k = 2.0 * i as f64 - span;
        half * (k / span)
    })
}

/// Meshgrid with `[x, y]` indexing.
fn meshgrid_ij(x: &Array1<f64>, y: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (x.len(), y.len());
    let xx = Array2::from_shape_fn(shape, |(i, _)| x[i]);
    let yy = Array2::from_shape_fn(shape, |(_, j)| y[j]);
    (xx, yy)
}

/// Build the native grid. The downwind axis starts at 1 m so that no
/// sample sits on the sensor itself.
pub fn build_grid(domain_length: f64, resolution: f64, time: &[i64]) -> Result<ComputationalGrid> {
    validate_domain(domain_length, resolution)?;
    let n = axis_len(domain_length, resolution);

    let x = Array1::linspace(1.0, domain_length, n);
    let y = symmetric_axis(domain_length / 2.0, n);
    let (xx, yy) = meshgrid_ij(&x, &y);

    Ok(ComputationalGrid {
        domain_length,
        resolution,
        x,
        y,
        xx,
        yy,
        time: time.to_vec(),
    })
}

/// Build the output template spanning `[-domain_length, domain_length]`
/// on both axes with twice the native sample count.
pub fn build_template(domain_length: f64, resolution: f64) -> Result<TemplateGrid> {
    validate_domain(domain_length, resolution)?;
    let n = 2 * axis_len(domain_length, resolution);

    let x = symmetric_axis(domain_length, n);
    let y = symmetric_axis(domain_length, n);
    let (xx, _) = meshgrid_ij(&x, &y);

    // Row-major over [x, y]: the resampler reshapes its output with the same order.
    let query_points =
        Array2::from_shape_fn((n * n, 2), |(k, c)| if c == 0 { x[k / n] } else { y[k % n] });

    Ok(TemplateGrid {
        x,
        y,
        xx,
        query_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downwind_axis_strictly_positive() {
        for &(len, res) in &[(1000.0, 5.0), (1000.0, 1.0), (37.0, 4.0), (5.0, 5.0)] {
            let grid = build_grid(len, res, &[0]).unwrap();
            assert!(grid.x.iter().all(|&v| v > 0.0), "len={len} res={res}");
            assert_eq!(grid.x.len(), axis_len(len, res));
        }
    }

    #[test]
    fn test_grid_axes_match_domain() {
        let grid = build_grid(1000.0, 5.0, &[1, 2, 3]).unwrap();
        assert_eq!(grid.shape(), (200, 200));
        assert_eq!(grid.n_time(), 3);
        assert_eq!(grid.x[0], 1.0);
        assert!((grid.x[199] - 1000.0).abs() < 1e-9);
        assert_eq!(grid.y[0], -500.0);
        assert_eq!(grid.y[199], 500.0);
        assert_eq!(grid.xx[[7, 3]], grid.x[7]);
        assert_eq!(grid.yy[[7, 3]], grid.y[3]);
    }

    #[test]
    fn test_template_symmetric_and_double_length() {
        for &(len, res) in &[(1000.0, 5.0), (300.0, 7.0), (10.0, 3.0)] {
            let grid = build_grid(len, res, &[0]).unwrap();
            let tpl = build_template(len, res).unwrap();
            assert_eq!(tpl.x.len(), 2 * grid.x.len());
            assert_eq!(tpl.y.len(), 2 * grid.y.len());
            let n = tpl.x.len();
            for i in 0..n {
                assert_eq!(tpl.x[i], -tpl.x[n - 1 - i]);
                assert_eq!(tpl.y[i], -tpl.y[n - 1 - i]);
            }
            assert_eq!(tpl.x[0], -len);
            assert_eq!(tpl.x[n - 1], len);
        }
    }

    #[test]
    fn test_query_points_are_x_major() {
        let tpl = build_template(20.0, 5.0).unwrap();
        let (nx, ny) = tpl.shape();
        assert_eq!(tpl.query_points.dim(), (nx * ny, 2));
        for i in 0..nx {
            for j in 0..ny {
                let row = tpl.query_points.row(i * ny + j);
                assert_eq!(row[0], tpl.x[i]);
                assert_eq!(row[1], tpl.y[j]);
            }
        }
    }

    #[test]
    fn test_degenerate_domain_rejected() {
        assert!(build_grid(0.0, 5.0, &[0]).is_err());
        assert!(build_grid(3.0, 5.0, &[0]).is_err());
        assert!(build_template(-10.0, 1.0).is_err());
    }
}
