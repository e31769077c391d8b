use geo::{Coord, Geometry, LineString, Polygon, Rect};
use tracing::{debug, instrument};

use super::addition::run_addition_phase;
use super::edge_store::{EdgeStore, ReferenceEdge};
use super::error::SnapError;
use super::kernel::GeometryKernel;
use super::removal::run_removal_phase;

/// Defensive cap on the outer addition/removal loop (`§4.6`): bounds runaway iteration if a
/// pathological tolerance pair keeps shaking vertices loose forever.
const MAX_OUTER_ITERATIONS: usize = 10_000;

/// Per-call configuration for [`snap`].
#[derive(Debug, Clone, Copy)]
pub struct SnapConfig {
    /// Maximum distance at which a reference-edge vertex may be inserted.
    pub tolerance_snap: f64,
    /// Maximum distance at which an interior vertex may be removed. Negative disables removal.
    pub tolerance_removal: f64,
    /// Whether the addition/removal loop runs to a fixed point instead of a single pass.
    pub iterate: bool,
}

/// Caches the work extent and the lazily-fetched reference edges for one point array.
struct WorkExtentCache {
    expanded_workext: Rect<f64>,
    edges: Option<Vec<ReferenceEdge>>,
}

impl WorkExtentCache {
    fn begin_pointarray(
        kernel: &dyn GeometryKernel,
        points: &[Coord<f64>],
        tolerance_snap: f64,
    ) -> Self {
        let workext = kernel.bbox_of(points);
        let expanded_workext = kernel.bbox_expand(workext, tolerance_snap.max(0.0));
        Self {
            expanded_workext,
            edges: None,
        }
    }

    fn edges<S: EdgeStore>(&mut self, store: &S) -> Result<&[ReferenceEdge], SnapError> {
        if self.edges.is_none() {
            self.edges = Some(store.edges_within_box(self.expanded_workext)?);
        }
        Ok(self.edges.as_deref().unwrap())
    }

    fn release<S: EdgeStore>(&mut self, store: &S) {
        if let Some(edges) = self.edges.take() {
            store.release_edges(edges);
        }
    }
}

/// Snap `geometry` against the reference topology served by `store`, returning a modified clone.
///
/// `geometry` is never mutated. On any failure the clone is dropped and the error is returned;
/// there is no partial output.
#[instrument(skip(kernel, store, geometry), fields(tolerance_snap = config.tolerance_snap, tolerance_removal = config.tolerance_removal, iterate = config.iterate))]
pub fn snap<S: EdgeStore>(
    kernel: &dyn GeometryKernel,
    store: &S,
    geometry: &Geometry<f64>,
    config: SnapConfig,
) -> Result<Geometry<f64>, SnapError> {
    let mut output = geometry.clone();
    visit_lines_mut(kernel, store, &mut output, config)?;
    Ok(output)
}

/// Recursively visit every linear point array of `geometry`, snapping each in place.
fn visit_lines_mut<S: EdgeStore>(
    kernel: &dyn GeometryKernel,
    store: &S,
    geometry: &mut Geometry<f64>,
    config: SnapConfig,
) -> Result<(), SnapError> {
    match geometry {
        Geometry::LineString(ls) => snap_linestring(kernel, store, ls, config),
        Geometry::Polygon(poly) => snap_polygon(kernel, store, poly, config),
        Geometry::MultiLineString(multi) => {
            for ls in &mut multi.0 {
                snap_linestring(kernel, store, ls, config)?;
            }
            Ok(())
        }
        Geometry::MultiPolygon(multi) => {
            for poly in &mut multi.0 {
                snap_polygon(kernel, store, poly, config)?;
            }
            Ok(())
        }
        Geometry::GeometryCollection(collection) => {
            for g in &mut collection.0 {
                visit_lines_mut(kernel, store, g, config)?;
            }
            Ok(())
        }
        // Points, rects and triangles have no interior vertex to snap.
        _ => Ok(()),
    }
}

fn snap_linestring<S: EdgeStore>(
    kernel: &dyn GeometryKernel,
    store: &S,
    ls: &mut LineString<f64>,
    config: SnapConfig,
) -> Result<(), SnapError> {
    if ls.0.len() < 2 {
        return Ok(());
    }
    let mut points = ls.0.clone();
    snap_pointarray(kernel, store, &mut points, config)?;
    *ls = LineString::new(points);
    Ok(())
}

fn snap_polygon<S: EdgeStore>(
    kernel: &dyn GeometryKernel,
    store: &S,
    poly: &mut Polygon<f64>,
    config: SnapConfig,
) -> Result<(), SnapError> {
    // API design is hard: there's no way to mutate a Polygon's rings without cloning it first.
    let (mut exterior, mut interiors) = poly.clone().into_inner();
    snap_linestring(kernel, store, &mut exterior, config)?;
    for interior in &mut interiors {
        snap_linestring(kernel, store, interior, config)?;
    }
    *poly = Polygon::new(exterior, interiors);
    Ok(())
}

/// Alternate the Addition and Removal phases over one point array until stable.
fn snap_pointarray<S: EdgeStore>(
    kernel: &dyn GeometryKernel,
    store: &S,
    points: &mut Vec<Coord<f64>>,
    config: SnapConfig,
) -> Result<(), SnapError> {
    let mut cache = WorkExtentCache::begin_pointarray(kernel, points, config.tolerance_snap);
    let expanded_workext = cache.expanded_workext;

    let mut outer_iterations = 0usize;
    loop {
        outer_iterations += 1;
        if outer_iterations > MAX_OUTER_ITERATIONS {
            cache.release(store);
            return Err(SnapError::BoundsExceeded);
        }

        let edges = cache.edges(store)?;
        run_addition_phase(
            kernel,
            points,
            edges,
            expanded_workext,
            config.tolerance_snap,
            config.iterate,
        )?;

        let removed = if config.tolerance_removal >= 0.0 {
            let edges = cache.edges(store)?;
            run_removal_phase(kernel, points, edges, config.tolerance_removal)?
        } else {
            0
        };

        if !config.iterate || removed == 0 {
            break;
        }
    }

    debug!(vertices = points.len(), "point array snap complete");
    cache.release(store);
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, LineString};

    use super::*;
    use crate::snap::edge_store::InMemoryEdgeStore;
    use crate::snap::kernel::EuclideanKernel;

    fn reference_edge(points: &[(f64, f64)]) -> ReferenceEdge {
        ReferenceEdge::new(0, points.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    fn linestring(points: &[(f64, f64)]) -> Geometry<f64> {
        Geometry::LineString(LineString::from(points.to_vec()))
    }

    fn default_config(tolerance_snap: f64, tolerance_removal: f64) -> SnapConfig {
        SnapConfig {
            tolerance_snap,
            tolerance_removal,
            iterate: true,
        }
    }

    #[test]
    fn test_s1_basic_insertion() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([
            reference_edge(&[(0.0, 0.0), (10.0, 0.0)]),
            reference_edge(&[(5.0, 0.2), (5.0, 5.0)]),
        ]);
        let input = linestring(&[(0.0, 0.0), (10.0, 0.0)]);

        let output = snap(&kernel, &store, &input, default_config(1.0, -1.0)).unwrap();
        let expected = linestring(&[(0.0, 0.0), (5.0, 0.2), (10.0, 0.0)]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_s2_coverage_veto() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([reference_edge(&[(0.0, 0.0), (10.0, 0.0)])]);
        let input = linestring(&[(0.0, 0.0), (10.0, 0.0)]);

        let output = snap(&kernel, &store, &input, default_config(1.0, -1.0)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_s5_removal() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([reference_edge(&[(0.0, 0.0), (10.0, 0.0)])]);
        let input = linestring(&[(0.0, 0.0), (3.0, 0.1), (7.0, -0.2), (10.0, 0.0)]);

        let output = snap(&kernel, &store, &input, default_config(0.0, 0.5)).unwrap();
        let expected = linestring(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_s6_empty_topology_is_a_no_op() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([]);
        let input = linestring(&[(0.0, 0.0), (3.0, 0.1), (10.0, 0.0)]);

        let output = snap(&kernel, &store, &input, default_config(1.0, -1.0)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_zero_tolerance_is_a_no_op() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([reference_edge(&[(5.0, 0.2), (5.0, 5.0)])]);
        let input = linestring(&[(0.0, 0.0), (10.0, 0.0)]);

        let output = snap(&kernel, &store, &input, default_config(0.0, -1.0)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_input_geometry_is_never_mutated() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([reference_edge(&[(5.0, 0.2), (5.0, 5.0)])]);
        let input = linestring(&[(0.0, 0.0), (10.0, 0.0)]);
        let input_clone = input.clone();

        let _ = snap(&kernel, &store, &input, default_config(1.0, -1.0)).unwrap();
        assert_eq!(input, input_clone);
    }

    #[test]
    fn test_fixpoint_is_idempotent() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([
            reference_edge(&[(0.0, 0.0), (10.0, 0.0)]),
            reference_edge(&[(5.0, 0.2), (5.0, 5.0)]),
        ]);
        let input = linestring(&[(0.0, 0.0), (10.0, 0.0)]);

        let config = default_config(1.0, -1.0);
        let once = snap(&kernel, &store, &input, config).unwrap();
        let twice = snap(&kernel, &store, &once, config).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_polygon_rings_are_snapped() {
        let kernel = EuclideanKernel;
        let store = InMemoryEdgeStore::new([reference_edge(&[(5.0, 0.1), (5.0, 5.0)])]);
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let input = Geometry::Polygon(Polygon::new(ring, vec![]));

        let output = snap(&kernel, &store, &input, default_config(1.0, -1.0)).unwrap();
        let Geometry::Polygon(poly) = output else {
            panic!("expected a polygon");
        };
        assert!(poly.exterior().0.contains(&Coord { x: 5.0, y: 0.1 }));
    }
}
