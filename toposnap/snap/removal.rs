use geo::{Coord, Line};
use tracing::{debug, trace};

use super::edge_store::ReferenceEdge;
use super::error::SnapError;
use super::kernel::GeometryKernel;

/// Delete interior vertices of `points` within `tolerance_removal` of some reference edge, whose
/// projection onto that edge's closest segment is strictly interior to it.
///
/// Returns the number of vertices removed. A no-op when `tolerance_removal < 0.0`.
pub fn run_removal_phase(
    kernel: &dyn GeometryKernel,
    points: &mut Vec<Coord<f64>>,
    edges: &[ReferenceEdge],
    tolerance_removal: f64,
) -> Result<usize, SnapError> {
    if tolerance_removal < 0.0 {
        return Ok(0);
    }

    let mut removed = 0usize;
    let mut i = 1usize;

    while points.len() >= 3 && i + 1 < points.len() {
        let v = points[i];

        let mut closest: Option<(Line<f64>, f64)> = None;
        for edge in edges {
            for segno in 0..edge.points.len().saturating_sub(1) {
                let seg = Line::new(edge.points[segno], edge.points[segno + 1]);
                let dist = kernel.dist2d_point_segment(v, seg)?;
                let better = match closest {
                    Some((_, best_dist)) => dist < best_dist,
                    None => true,
                };
                if better {
                    closest = Some((seg, dist));
                }
            }
        }

        let Some((seg, dist)) = closest else {
            i += 1;
            continue;
        };

        if dist > tolerance_removal {
            i += 1;
            continue;
        }

        let proj = kernel.closest_point_on_segment(v, seg);
        if kernel.point_equal(proj, seg.start) || kernel.point_equal(proj, seg.end) {
            i += 1;
            continue;
        }

        if i >= points.len() {
            return Err(SnapError::MutationFailure);
        }
        points.remove(i);
        removed += 1;
        trace!(index = i, "removed redundant vertex");
        // Don't advance: the vertex now at `i` is the one that followed the removed vertex, and
        // its closest reference segment may have changed.
    }

    debug!(removed, "removal phase complete");
    Ok(removed)
}
