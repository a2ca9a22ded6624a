//! Static 2-D k-d tree for k-nearest-neighbour queries.
//!
//! The tree is implicit: point indices are permuted in place so that every
//! sub-range `[lo, hi)` stores its splitting point at the midpoint, with
//! smaller coordinates (along the split axis) to the left. Small ranges are
//! scanned linearly.

const LEAF_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug)]
pub struct KdTree {
    points: Vec<[f64; 2]>,
    order: Vec<usize>,
}

impl KdTree {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        build(&points, &mut order, 0);
        Self { points, order }
    }

    /// Build from parallel coordinate slices.
    pub fn from_coords(x: impl IntoIterator<Item = f64>, y: impl IntoIterator<Item = f64>) -> Self {
        Self::new(x.into_iter().zip(y).map(|(x, y)| [x, y]).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> [f64; 2] {
        self.points[index]
    }

    /// The `k` points closest to `query`, nearest first. Fewer are returned
    /// when the tree holds fewer than `k` points.
    pub fn nearest(&self, query: [f64; 2], k: usize) -> Vec<Neighbor> {
        if k == 0 || self.points.is_empty() {
            return Vec::new();
        }
        let mut best = Best::new(k);
        self.search(0, self.order.len(), 0, query, &mut best);
        best.items
            .into_iter()
            .map(|(d2, index)| Neighbor {
                index,
                distance: d2.sqrt(),
            })
            .collect()
    }

    fn search(&self, lo: usize, hi: usize, depth: usize, q: [f64; 2], best: &mut Best) {
        if hi - lo <= LEAF_SIZE {
            for &idx in &self.order[lo..hi] {
                best.offer(dist2(self.points[idx], q), idx);
            }
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let axis = depth % 2;
        let idx = self.order[mid];
        let split = self.points[idx];
        best.offer(dist2(split, q), idx);

        let diff = q[axis] - split[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        if near.0 < near.1 {
            self.search(near.0, near.1, depth + 1, q, best);
        }
        if far.0 < far.1 && diff * diff <= best.bound() {
            self.search(far.0, far.1, depth + 1, q, best);
        }
    }
}

fn build(points: &[[f64; 2]], order: &mut [usize], depth: usize) {
    if order.len() <= LEAF_SIZE {
        return;
    }
    let mid = order.len() / 2;
    let axis = depth % 2;
    order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));
    let (left, rest) = order.split_at_mut(mid);
    build(points, left, depth + 1);
    build(points, &mut rest[1..], depth + 1);
}

#[inline]
fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Sorted buffer of the `k` best `(squared distance, index)` candidates.
struct Best {
    k: usize,
    items: Vec<(f64, usize)>,
}

impl Best {
    fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k + 1),
        }
    }

    /// Squared radius a subtree must beat to matter.
    fn bound(&self) -> f64 {
        if self.items.len() < self.k {
            f64::INFINITY
        } else {
            self.items[self.k - 1].0
        }
    }

    fn offer(&mut self, d2: f64, index: usize) {
        if self.items.len() == self.k && d2 >= self.bound() {
            return;
        }
        let pos = self.items.partition_point(|&(d, _)| d <= d2);
        self.items.insert(pos, (d2, index));
        self.items.truncate(self.k);
    }
}
