//! Inverse-distance-weighted regridding of a rotated footprint onto the
//! template grid.
//!
//! For each template point the `k` nearest rotated samples are blended with
//! weights `1 / d²`. A template point that coincides with a sample takes that
//! sample's value directly.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::Workers;
use crate::error::Result;
use crate::grid::TemplateGrid;
use crate::kdtree::{KdTree, Neighbor};
use crate::rotate::RotatedField;

pub const DEFAULT_NEIGHBORS: usize = 4;

/// Nearest-neighbour regridder with its own search thread pool.
pub struct Resampler {
    k: usize,
    pool: ThreadPool,
}

impl Resampler {
    pub fn new(k: usize, workers: Workers) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.threads())
            .thread_name(|i| format!("footprint-search-{i}"))
            .build()?;
        Ok(Self { k, pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Resample a rotated field onto `template`, shape `[x, y]` of the template.
    pub fn regrid(&self, field: &RotatedField<'_>, template: &TemplateGrid) -> Array2<f64> {
        let tree = KdTree::from_coords(field.x.iter().copied(), field.y.iter().copied());
        let values: Vec<f64> = field.values.iter().copied().collect();
        let flat = self.resample(&tree, &values, template.query_points.view());

        let (nx, ny) = template.shape();
        Array2::from_shape_vec((nx, ny), flat).expect("one value per template query point")
    }

    /// Interpolate `values` (indexed like the tree's points) at every row of
    /// `queries`. Output order follows `queries`.
    pub fn resample(&self, tree: &KdTree, values: &[f64], queries: ArrayView2<f64>) -> Vec<f64> {
        debug_assert_eq!(tree.len(), values.len());
        let k = self.k;
        self.pool.install(|| {
            queries
                .outer_iter()
                .into_par_iter()
                .map(|q| idw(&tree.nearest([q[0], q[1]], k), values))
                .collect()
        })
    }
}

/// Weighted mean with weights `1 / d²`; an exact hit short-circuits.
#[inline]
pub(crate) fn idw(neighbors: &[Neighbor], values: &[f64]) -> f64 {
    if neighbors.is_empty() {
        return f64::NAN;
    }
    if let Some(hit) = neighbors.iter().find(|n| n.distance == 0.0) {
        return values[hit.index];
    }
    let (num, den) = neighbors.iter().fold((0.0, 0.0), |(num, den), n| {
        let w = 1.0 / (n.distance * n.distance);
        (num + w * values[n.index], den + w)
    });
    num / den
}
