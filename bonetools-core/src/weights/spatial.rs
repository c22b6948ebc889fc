//! Nearest-neighbour lookup over a fixed point set.
//!
//! [`KdTree`] is a balanced k-d tree stored as a flat node array over a permuted index
//! list, built once and queried many times. Small sets use a plain linear scan.
//! Both return the same answer: the closest point, ties going to the lowest index.

use glam::Vec3;

const LEAF_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance_sq: f32,
}

impl Neighbor {
    pub fn distance(&self) -> f32 { self.distance_sq.sqrt() }

    fn beats(&self, other: &Neighbor) -> bool {
        self.distance_sq < other.distance_sq || (self.distance_sq == other.distance_sq && self.index < other.index)
    }
}

fn offer(best: &mut Option<Neighbor>, candidate: Neighbor, limit_sq: f32) {
    if candidate.distance_sq > limit_sq {
        return;
    }
    if best.map_or(true, |b| candidate.beats(&b)) {
        *best = Some(candidate);
    }
}

fn limit_sq(max_distance: Option<f32>) -> f32 {
    max_distance.map_or(f32::INFINITY, |d| d * d)
}

#[derive(Debug, Clone, Copy)]
enum KdNode {
    Leaf { first: usize, count: usize },
    Split { axis: usize, value: f32, left: usize, right: usize },
}

#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<Vec3>,
    order: Vec<usize>,
    nodes: Vec<KdNode>,
}

impl KdTree {
    pub fn build(points: &[Vec3]) -> Self {
        let mut tree = Self { points: points.to_vec(), order: (0..points.len()).collect(), nodes: Vec::new() };
        if !points.is_empty() {
            tree.subdivide(0, points.len());
        }
        tree
    }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    fn bounds(&self, first: usize, count: usize) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &i in &self.order[first..first + count] {
            min = min.min(self.points[i]);
            max = max.max(self.points[i]);
        }
        (min, max)
    }

    fn subdivide(&mut self, first: usize, count: usize) -> usize {
        let node_idx = self.nodes.len();
        self.nodes.push(KdNode::Leaf { first, count });
        if count <= LEAF_SIZE {
            return node_idx;
        }

        let (min, max) = self.bounds(first, count);
        let extent = max - min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z { 0 } else if extent.y >= extent.z { 1 } else { 2 };
        // All points coincide: nothing to split.
        if extent[axis] <= 0.0 {
            return node_idx;
        }

        let mid = count / 2;
        let points = &self.points;
        self.order[first..first + count]
            .select_nth_unstable_by(mid, |a, b| points[*a][axis].total_cmp(&points[*b][axis]));
        let value = self.points[self.order[first + mid]][axis];

        let left = self.subdivide(first, mid);
        let right = self.subdivide(first + mid, count - mid);
        self.nodes[node_idx] = KdNode::Split { axis, value, left, right };
        node_idx
    }

    /// Closest point to `query`, or `None` if nothing lies within `max_distance`.
    pub fn nearest(&self, query: Vec3, max_distance: Option<f32>) -> Option<Neighbor> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = None;
        self.search(0, query, limit_sq(max_distance), &mut best);
        best
    }

    fn search(&self, node: usize, query: Vec3, limit_sq: f32, best: &mut Option<Neighbor>) {
        match self.nodes[node] {
            KdNode::Leaf { first, count } => {
                for &index in &self.order[first..first + count] {
                    let candidate = Neighbor { index, distance_sq: self.points[index].distance_squared(query) };
                    offer(best, candidate, limit_sq);
                }
            }
            KdNode::Split { axis, value, left, right } => {
                let diff = query[axis] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                self.search(near, query, limit_sq, best);
                // `<=` keeps equal-distance points on the far side in play for the index tie-break.
                let bound = best.map_or(limit_sq, |b| b.distance_sq);
                if diff * diff <= bound {
                    self.search(far, query, limit_sq, best);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum SpatialIndex {
    Linear(Vec<Vec3>),
    KdTree(KdTree),
}

impl SpatialIndex {
    /// Linear scan below `linear_scan_below` points, k-d tree otherwise.
    pub fn build(points: &[Vec3], linear_scan_below: usize) -> Self {
        if points.len() < linear_scan_below {
            log::debug!("spatial index: linear scan over {} points", points.len());
            SpatialIndex::Linear(points.to_vec())
        } else {
            let tree = KdTree::build(points);
            log::debug!("spatial index: k-d tree over {} points, {} nodes", points.len(), tree.nodes.len());
            SpatialIndex::KdTree(tree)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SpatialIndex::Linear(points) => points.len(),
            SpatialIndex::KdTree(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn nearest(&self, query: Vec3, max_distance: Option<f32>) -> Option<Neighbor> {
        match self {
            SpatialIndex::Linear(points) => {
                let limit = limit_sq(max_distance);
                let mut best = None;
                for (index, p) in points.iter().enumerate() {
                    offer(&mut best, Neighbor { index, distance_sq: p.distance_squared(query) }, limit);
                }
                best
            }
            SpatialIndex::KdTree(tree) => tree.nearest(query, max_distance),
        }
    }
}
