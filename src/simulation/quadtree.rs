//! # Point Quadtree (2D)
//!
//! This module implements a **bucketed point quadtree** used to answer
//! "which particles lie inside this circle?" faster than scanning the whole
//! population. It is rebuilt from scratch twice per tick, so it favours
//! cheap clear-and-reload over incremental updates.
//!
//! ## Core Concepts
//!
//! - The viewport rectangle is recursively subdivided into 4 quadrants.
//! - Each region becomes a node of the tree; nodes live in one arena `Vec`
//!   and refer to their children by index.
//! - A leaf stores up to `capacity` points in a bucket. When the bucket
//!   overflows, the leaf is split into 4 children and its points are pushed
//!   down.
//! - Nodes narrower than [`MIN_NODE_SIZE`] never split, so any number of
//!   coincident points (e.g. two particles overlapping right after a
//!   collision) end up sharing one bucket instead of recursing forever.
//! - Points outside the root bounds are kept in a side list that every
//!   query scans, so a particle dragged off-screen is never lost.
//!
//! ## Query
//!
//! A circular query walks only the nodes whose box touches the circle and
//! tests each bucketed point against the circle (inclusive boundary).

use crate::simulation::spatial::{Circle, IndexedPoint, SpatialIndex};
use crate::simulation::states::NVec2;

/// Nodes whose widest side is at or below this size are never subdivided
pub const MIN_NODE_SIZE: f64 = 1e-3;

/// A single quadtree node.
///
/// Each node covers an axis-aligned box and is either:
/// - a leaf (`children = None`) holding a bucket of points, or
/// - an internal node (`children = Some(..)`) with an empty bucket.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub bbox_min: NVec2,
    pub bbox_max: NVec2,
    pub children: Option<[usize; 4]>, // indices into QuadTree::nodes
    pub points: Vec<IndexedPoint>,
}

impl QuadNode {
    fn new(bbox_min: NVec2, bbox_max: NVec2) -> Self {
        Self {
            bbox_min,
            bbox_max,
            children: None,
            points: Vec::new(),
        }
    }

    fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.bbox_min.x && p.x <= self.bbox_max.x && p.y >= self.bbox_min.y && p.y <= self.bbox_max.y
    }
}

/// A complete quadtree over a fixed rectangle.
///
/// This structure owns:
/// - a vector of all nodes (`nodes`), the root at index `root`
/// - a list of points that fell outside the root rectangle (`outliers`)
#[derive(Debug, Clone)]
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
    capacity: usize,
    outliers: Vec<IndexedPoint>,
    len: usize,
}

impl QuadTree {
    /// Build an empty tree covering the viewport `[0, width] x [0, height]`.
    ///
    /// # Parameters
    /// - `width`, `height`: viewport size.
    /// - `capacity`: points a leaf may hold before it is split (at least 1).
    pub fn new(width: f64, height: f64, capacity: usize) -> Self {
        Self::with_bounds(NVec2::zeros(), NVec2::new(width, height), capacity)
    }

    /// Build an empty tree covering an arbitrary rectangle `[bbox_min, bbox_max]`.
    pub fn with_bounds(bbox_min: NVec2, bbox_max: NVec2, capacity: usize) -> Self {
        Self {
            nodes: vec![QuadNode::new(bbox_min, bbox_max)],
            root: 0,
            capacity: capacity.max(1),
            outliers: Vec::new(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of levels below the root (0 for a single leaf)
    pub fn depth(&self) -> usize {
        self.node_depth(self.root)
    }

    // helpers ==============================================================================

    fn node_depth(&self, node_idx: usize) -> usize {
        match self.nodes[node_idx].children {
            Some(children) => 1 + children.iter().map(|&c| self.node_depth(c)).max().unwrap_or(0),
            None => 0,
        }
    }

    /// Insert one point, starting from the given node.
    ///
    /// - If the node has children, the point is forwarded to the child whose
    ///   quadrant contains it.
    /// - Otherwise the point joins the node's bucket, and if the bucket now
    ///   exceeds `capacity` the node is subdivided (unless it is already at
    ///   the minimum size).
    fn insert_point(&mut self, node_idx: usize, point: IndexedPoint) {
        if let Some(children) = self.nodes[node_idx].children {
            let bbox_min = self.nodes[node_idx].bbox_min;
            let bbox_max = self.nodes[node_idx].bbox_max;
            let child = children[child_index_for_point(&point.position, &bbox_min, &bbox_max)];
            self.insert_point(child, point);
            return;
        }

        self.nodes[node_idx].points.push(point);

        if self.nodes[node_idx].points.len() > self.capacity && self.can_subdivide(node_idx) {
            self.subdivide(node_idx);
        }
    }

    fn can_subdivide(&self, node_idx: usize) -> bool {
        let size = self.nodes[node_idx].bbox_max - self.nodes[node_idx].bbox_min;
        size.x.max(size.y) > MIN_NODE_SIZE
    }

    /// Split a leaf into 4 children and push its bucket down.
    ///
    /// After subdivision the node is internal: its bucket is empty and every
    /// point it held now lives in one of the children (which may in turn
    /// split again if all points landed in the same quadrant).
    fn subdivide(&mut self, node_idx: usize) {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;

        let mut children = [0usize; 4];
        for (child_idx, slot) in children.iter_mut().enumerate() {
            let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, child_idx);
            *slot = self.nodes.len();
            self.nodes.push(QuadNode::new(cmin, cmax));
        }

        // Snapshot the bucket by value so no &mut node is live while recursing
        let points = std::mem::take(&mut self.nodes[node_idx].points);
        self.nodes[node_idx].children = Some(children);

        for point in points {
            self.insert_point(node_idx, point);
        }
    }

    /// Collect every point under `node_idx` that lies inside `region`.
    ///
    /// Subtrees whose box does not touch the circle are pruned.
    fn query_node(&self, node_idx: usize, region: &Circle, out: &mut Vec<IndexedPoint>) {
        let node = &self.nodes[node_idx];

        if !region.intersects_box(&node.bbox_min, &node.bbox_max) {
            return;
        }

        out.extend(node.points.iter().filter(|p| region.contains(&p.position)));

        if let Some(children) = node.children {
            for child in children {
                self.query_node(child, region, out);
            }
        }
    }
}

impl SpatialIndex for QuadTree {
    /// Reset to a single empty root. The arena keeps its allocation.
    fn clear(&mut self) {
        if self.len == 0 && self.nodes.len() == 1 {
            return;
        }
        self.nodes.truncate(1);
        let root = &mut self.nodes[self.root];
        root.children = None;
        root.points.clear();
        self.outliers.clear();
        self.len = 0;
    }

    fn insert(&mut self, points: &[IndexedPoint]) {
        for &point in points {
            if self.nodes[self.root].contains(&point.position) {
                self.insert_point(self.root, point);
            } else {
                self.outliers.push(point);
            }
            self.len += 1;
        }
    }

    fn query(&self, region: &Circle, out: &mut Vec<IndexedPoint>) {
        self.query_node(self.root, region, out);
        out.extend(self.outliers.iter().filter(|p| region.contains(&p.position)));
    }

    fn len(&self) -> usize {
        self.len
    }
}

// helpers ===========================================================================

/// Compute the quadrant index for a point within a node's bounding box.
///
/// - Bit 0 (value 1): X axis, 0 for left (x < center.x), 1 for right
/// - Bit 1 (value 2): Y axis, 0 for top (y < center.y), 1 for bottom
///
/// This encoding matches the layout of `children[0..4]`.
fn child_index_for_point(p: &NVec2, bbox_min: &NVec2, bbox_max: &NVec2) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; } // bit 0
    if p.y >= center.y { idx |= 2; } // bit 1

    idx
}

/// Compute the bounding box for a given child quadrant, using the same
/// bit encoding as [`child_index_for_point`].
fn child_bbox(parent_min: &NVec2, parent_max: &NVec2, child_idx: usize) -> (NVec2, NVec2) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    // x: bit 0
    if (child_idx & 1) == 0 {
        max.x = center.x;
    } else {
        min.x = center.x;
    }

    // y: bit 1
    if (child_idx & 2) == 0 {
        max.y = center.y;
    } else {
        min.y = center.y;
    }

    (min, max)
}
