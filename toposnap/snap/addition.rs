use geo::{Coord, Line, Rect};
use tracing::{debug, trace};

use super::candidate::find_candidates;
use super::coverage::segment_is_covered;
use super::edge_store::ReferenceEdge;
use super::error::SnapError;
use super::kernel::GeometryKernel;

/// Insert reference-edge vertices into `points` until no more candidates survive, or (when
/// `iterate` is false) after at most one insertion.
///
/// Returns the number of vertices inserted.
pub fn run_addition_phase(
    kernel: &dyn GeometryKernel,
    points: &mut Vec<Coord<f64>>,
    edges: &[ReferenceEdge],
    expanded_workext: Rect<f64>,
    tolerance_snap: f64,
    iterate: bool,
) -> Result<usize, SnapError> {
    let mut inserted = 0usize;
    while addition_pass(kernel, points, edges, expanded_workext, tolerance_snap)? {
        inserted += 1;
        if !iterate {
            break;
        }
    }
    debug!(inserted, "addition phase complete");
    Ok(inserted)
}

/// A single pass: find the best candidate, validate it, and insert it. Returns whether a vertex
/// was inserted.
fn addition_pass(
    kernel: &dyn GeometryKernel,
    points: &mut Vec<Coord<f64>>,
    edges: &[ReferenceEdge],
    expanded_workext: Rect<f64>,
    tolerance_snap: f64,
) -> Result<bool, SnapError> {
    let candidates = find_candidates(kernel, points, edges, expanded_workext, tolerance_snap)?;

    for candidate in candidates {
        let seg = Line::new(points[candidate.segno], points[candidate.segno + 1]);
        let proj = kernel.closest_point_on_segment(candidate.pt, seg);

        if kernel.point_equal(proj, seg.start) || kernel.point_equal(proj, seg.end) {
            trace!(segno = candidate.segno, "candidate projects onto an existing vertex, skipping");
            continue;
        }

        if segment_is_covered(kernel, edges, seg)? {
            trace!(segno = candidate.segno, "segment already covered, skipping candidate");
            continue;
        }

        if candidate.segno + 1 > points.len() {
            return Err(SnapError::MutationFailure);
        }
        points.insert(candidate.segno + 1, candidate.pt);
        trace!(segno = candidate.segno, pt = ?candidate.pt, "inserted vertex");
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::edge_store::ReferenceEdge;
    use crate::snap::kernel::EuclideanKernel;

    fn edge(points: &[(f64, f64)]) -> ReferenceEdge {
        ReferenceEdge::new(0, points.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn test_basic_insertion() {
        let kernel = EuclideanKernel;
        let mut points = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }];
        let edges = [edge(&[(5.0, 0.2)])];
        let workext = kernel.bbox_of(&points);
        let expanded = kernel.bbox_expand(workext, 1.0);

        let inserted =
            run_addition_phase(&kernel, &mut points, &edges, expanded, 1.0, true).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(
            points,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 5.0, y: 0.2 },
                Coord { x: 10.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn test_endpoint_veto() {
        let kernel = EuclideanKernel;
        let mut points = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }];
        let edges = [edge(&[(0.0, 0.0)])];
        let workext = kernel.bbox_of(&points);
        let expanded = kernel.bbox_expand(workext, 1.0);

        let inserted =
            run_addition_phase(&kernel, &mut points, &edges, expanded, 1.0, true).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_coverage_veto() {
        let kernel = EuclideanKernel;
        let mut points = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }];
        let edges = [edge(&[(0.0, 0.0), (10.0, 0.0)])];
        let workext = kernel.bbox_of(&points);
        let expanded = kernel.bbox_expand(workext, 1.0);

        let inserted =
            run_addition_phase(&kernel, &mut points, &edges, expanded, 1.0, true).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_non_iterating_stops_after_one_insertion() {
        let kernel = EuclideanKernel;
        let mut points = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }];
        let edges = [edge(&[(3.0, 0.9), (7.0, 0.5)])];
        let workext = kernel.bbox_of(&points);
        let expanded = kernel.bbox_expand(workext, 1.0);

        let inserted =
            run_addition_phase(&kernel, &mut points, &edges, expanded, 1.0, false).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(points.len(), 3);
        // the closest candidate, (7, 0.5), wins the single pass
        assert!(points.contains(&Coord { x: 7.0, y: 0.5 }));
    }
}
