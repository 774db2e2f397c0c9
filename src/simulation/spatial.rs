//! Spatial indexing abstractions for neighborhood queries.
//!
//! The tick only needs three capabilities from an index: empty it, bulk-load
//! points, and list every point inside a circle. [`SpatialIndex`] captures
//! exactly that so the quadtree can be swapped for any other structure that
//! honours the same query contract.

use crate::simulation::states::{NVec2, Particle};

/// A point in the index carrying a back-reference to its owning particle.
///
/// `index` is the particle's position in the slice the index was built
/// from. Callers filter self-matches by comparing `index`, never by
/// coordinates, because overlapping particles can share coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    pub position: NVec2,
    pub index: usize,
}

impl IndexedPoint {
    pub fn new(x: f64, y: f64, index: usize) -> Self {
        Self {
            position: NVec2::new(x, y),
            index,
        }
    }

    pub fn from_particle(index: usize, particle: &Particle) -> Self {
        Self::new(particle.x, particle.y, index)
    }
}

/// Circular query region; the boundary is inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: NVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: NVec2::new(x, y),
            radius,
        }
    }

    pub fn contains(&self, p: &NVec2) -> bool {
        let d = p - self.center;
        d.dot(&d) <= self.radius * self.radius
    }

    /// True when the circle touches the axis-aligned box `[min, max]`
    pub fn intersects_box(&self, min: &NVec2, max: &NVec2) -> bool {
        let closest = NVec2::new(
            self.center.x.clamp(min.x, max.x),
            self.center.y.clamp(min.y, max.y),
        );
        self.contains(&closest)
    }
}

/// Behaviour shared by every neighborhood index the tick can run against
pub trait SpatialIndex {
    /// Drop every point; a no-op on an empty index
    fn clear(&mut self);

    /// Bulk-load points. Duplicate coordinates are allowed.
    fn insert(&mut self, points: &[IndexedPoint]);

    /// Append every point inside `region` (inclusive) to `out`.
    ///
    /// The querying particle itself is returned too if it was inserted.
    fn query(&self, region: &Circle, out: &mut Vec<IndexedPoint>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force index: stores points in a flat list and scans all of them.
///
/// Used as a correctness oracle and as the benchmark baseline.
#[derive(Debug, Default, Clone)]
pub struct LinearIndex {
    points: Vec<IndexedPoint>,
}

impl LinearIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for LinearIndex {
    fn clear(&mut self) {
        self.points.clear();
    }

    fn insert(&mut self, points: &[IndexedPoint]) {
        self.points.extend_from_slice(points);
    }

    fn query(&self, region: &Circle, out: &mut Vec<IndexedPoint>) {
        out.extend(self.points.iter().filter(|p| region.contains(&p.position)));
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
