//! Rotation of a timestep's native grid into the north-aligned template frame.
//!
//! The template's first axis points north and its second east. A rotation by
//! `θ = -wind_direction · π/180` maps the native downwind axis onto the
//! bearing the wind blows from, so the footprint lies upwind of the sensor:
//! north for a 0° wind, east for 90°.

use ndarray::{Array2, ArrayView2, Zip};

use crate::grid::ComputationalGrid;

/// One timestep's footprint values with coordinates in the template frame.
///
/// The values are the unmodified native samples; only their positions change.
#[derive(Debug)]
pub struct RotatedField<'a> {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub values: ArrayView2<'a, f64>,
}

/// Rotate every `(xx, yy)` pair by the wind direction in degrees.
pub fn rotate_coordinates(
    xx: ArrayView2<f64>,
    yy: ArrayView2<f64>,
    wind_direction: f64,
) -> (Array2<f64>, Array2<f64>) {
    let rot = -wind_direction * std::f64::consts::PI / 180.0;
    let (sin, cos) = rot.sin_cos();

    let x = Zip::from(&xx)
        .and(&yy)
        .par_map_collect(|&px, &py| px * cos + py * sin);
    let y = Zip::from(&xx)
        .and(&yy)
        .par_map_collect(|&px, &py| -px * sin + py * cos);
    (x, y)
}

/// Relabel a `[x, y]` footprint slice with rotated coordinates.
pub fn rotate<'a>(
    grid: &ComputationalGrid,
    values: ArrayView2<'a, f64>,
    wind_direction: f64,
) -> RotatedField<'a> {
    debug_assert_eq!(values.dim(), grid.shape());
    let (x, y) = rotate_coordinates(grid.xx.view(), grid.yy.view(), wind_direction);
    RotatedField { x, y, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid;

    fn max_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        Zip::from(a)
            .and(b)
            .fold(0.0_f64, |acc, &p, &q| acc.max((p - q).abs()))
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let grid = build_grid(100.0, 5.0, &[0]).unwrap();
        let (x, y) = rotate_coordinates(grid.xx.view(), grid.yy.view(), 0.0);
        assert_eq!(x, grid.xx);
        assert_eq!(y, grid.yy);
    }

    #[test]
    fn test_full_turn_is_periodic() {
        let grid = build_grid(1000.0, 5.0, &[0]).unwrap();
        let (x0, y0) = rotate_coordinates(grid.xx.view(), grid.yy.view(), 0.0);
        let (x1, y1) = rotate_coordinates(grid.xx.view(), grid.yy.view(), 360.0);
        assert!(max_diff(&x0, &x1) < 1e-9);
        assert!(max_diff(&y0, &y1) < 1e-9);
    }

    #[test]
    fn test_downwind_axis_follows_bearing() {
        // A point 100 m along the native downwind axis.
        let xx = Array2::from_elem((1, 1), 100.0);
        let yy = Array2::zeros((1, 1));
        let at = |wd: f64| {
            let (x, y) = rotate_coordinates(xx.view(), yy.view(), wd);
            (x[[0, 0]], y[[0, 0]])
        };
        let (n, e) = at(90.0);
        assert!(n.abs() < 1e-9 && (e - 100.0).abs() < 1e-9, "({n}, {e})");
        let (n, e) = at(180.0);
        assert!((n + 100.0).abs() < 1e-9 && e.abs() < 1e-9, "({n}, {e})");
        let (n, e) = at(270.0);
        assert!(n.abs() < 1e-9 && (e + 100.0).abs() < 1e-9, "({n}, {e})");
    }

    #[test]
    fn test_rotation_preserves_distance_and_values() {
        let grid = build_grid(200.0, 10.0, &[0]).unwrap();
        let values = Array2::from_shape_fn(grid.shape(), |(i, j)| (i * 100 + j) as f64);
        let field = rotate(&grid, values.view(), 37.5);
        assert_eq!(field.values, values.view());
        Zip::from(&field.x)
            .and(&field.y)
            .and(&grid.xx)
            .and(&grid.yy)
            .for_each(|&x, &y, &px, &py| {
                let r0 = (px * px + py * py).sqrt();
                let r1 = (x * x + y * y).sqrt();
                assert!((r0 - r1).abs() < 1e-9);
            });
    }
}
