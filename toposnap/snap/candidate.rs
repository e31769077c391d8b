use geo::{Coord, Line, Rect};
use tracing::trace;

use super::edge_store::ReferenceEdge;
use super::error::SnapError;
use super::kernel::GeometryKernel;

/// A reference-edge vertex close enough to `points` to be a snap target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub pt: Coord<f64>,
    pub segno: usize,
    pub dist: f64,
}

/// Collect and order every candidate vertex within `tolerance_snap` of some segment of `points`.
///
/// The returned order is the external contract: ascending by distance, then by `pt.x`, then by
/// `pt.y`. Callers must not re-sort or otherwise depend on a different tie-break.
pub fn find_candidates(
    kernel: &dyn GeometryKernel,
    points: &[Coord<f64>],
    edges: &[ReferenceEdge],
    expanded_workext: Rect<f64>,
    tolerance_snap: f64,
) -> Result<Vec<SnapCandidate>, SnapError> {
    let mut candidates = Vec::new();

    for edge in edges {
        for &v in &edge.points {
            if !rect_contains(expanded_workext, v) {
                continue;
            }

            let mut closest: Option<(usize, f64)> = None;
            for segno in 0..points.len().saturating_sub(1) {
                let seg = Line::new(points[segno], points[segno + 1]);
                let dist = kernel.dist2d_point_segment(v, seg)?;
                let better = match closest {
                    Some((_, best_dist)) => dist < best_dist,
                    None => true,
                };
                if better {
                    closest = Some((segno, dist));
                }
            }

            if let Some((segno, dist)) = closest {
                if dist <= tolerance_snap {
                    candidates.push(SnapCandidate { pt: v, segno, dist });
                }
            }
        }
    }

    candidates.sort_by(|a, b| {
        a.dist
            .total_cmp(&b.dist)
            .then_with(|| a.pt.x.total_cmp(&b.pt.x))
            .then_with(|| a.pt.y.total_cmp(&b.pt.y))
    });

    trace!(count = candidates.len(), "collected snap candidates");
    Ok(candidates)
}

fn rect_contains(rect: Rect<f64>, p: Coord<f64>) -> bool {
    p.x >= rect.min().x && p.x <= rect.max().x && p.y >= rect.min().y && p.y <= rect.max().y
}
