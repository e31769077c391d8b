use geo::{Coord, Rect};
use rstar::{AABB, RTree, RTreeObject};

use super::error::SnapError;

/// One polyline of the reference topology the input is aligned against.
///
/// Immutable for the lifetime of a snap call; the engine only ever borrows these.
#[derive(Debug, Clone)]
pub struct ReferenceEdge {
    pub id: u64,
    pub points: Vec<Coord<f64>>,
}

impl ReferenceEdge {
    pub fn new(id: u64, points: Vec<Coord<f64>>) -> Self {
        Self { id, points }
    }

    fn envelope(&self) -> AABB<[f64; 2]> {
        let first = self.points[0];
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        AABB::from_corners([min_x, min_y], [max_x, max_y])
    }
}

impl RTreeObject for ReferenceEdge {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        ReferenceEdge::envelope(self)
    }
}

/// Spatial lookup over the reference topology's edges.
pub trait EdgeStore {
    /// All reference edges whose bounding box intersects `bbox`.
    ///
    /// Ordering is unspecified; the engine sorts candidates itself and must not depend on the
    /// order edges come back in.
    fn edges_within_box(&self, bbox: Rect<f64>) -> Result<Vec<ReferenceEdge>, SnapError>;

    /// Release edges previously returned by [`EdgeStore::edges_within_box`]. Idempotent.
    fn release_edges(&self, _edges: Vec<ReferenceEdge>) {}
}

/// Process-local [`EdgeStore`] backed by an in-memory R-tree.
///
/// Built once from a fixed set of edges; the query shape is a bounding-box intersection, not a
/// nearest-point lookup, which is why this reaches for an R-tree rather than a k-d tree.
pub struct InMemoryEdgeStore {
    tree: RTree<ReferenceEdge>,
}

impl InMemoryEdgeStore {
    pub fn new(edges: impl IntoIterator<Item = ReferenceEdge>) -> Self {
        let edges: Vec<_> = edges.into_iter().filter(|e| e.points.len() >= 2).collect();
        Self {
            tree: RTree::bulk_load(edges),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl EdgeStore for InMemoryEdgeStore {
    fn edges_within_box(&self, bbox: Rect<f64>) -> Result<Vec<ReferenceEdge>, SnapError> {
        let envelope = AABB::from_corners(
            [bbox.min().x, bbox.min().y],
            [bbox.max().x, bbox.max().y],
        );
        Ok(self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .cloned()
            .collect())
    }
}
