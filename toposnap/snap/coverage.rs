use geo::Line;

use super::edge_store::ReferenceEdge;
use super::error::SnapError;
use super::kernel::GeometryKernel;

/// Whether some reference edge already covers `seg`, i.e. `seg` already lies on the reference
/// topology and inserting a vertex into it would be redundant.
pub fn segment_is_covered(
    kernel: &dyn GeometryKernel,
    edges: &[ReferenceEdge],
    seg: Line<f64>,
) -> Result<bool, SnapError> {
    for edge in edges {
        if kernel.covers(&edge.points, seg)? {
            return Ok(true);
        }
    }
    Ok(false)
}
