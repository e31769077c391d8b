use geo::{Coord, Line, Rect};

use super::error::SnapError;

/// The numeric primitives the snapping engine needs from a 2-D geometry library.
///
/// Kept as a trait rather than calling into `geo` directly so tests can swap in a kernel that
/// returns canned failures to exercise the error paths, and so the bit-exact equality and
/// closed-form projection the engine depends on for determinism are pinned down in one place.
pub trait GeometryKernel {
    /// Euclidean distance from `p` to the closed segment `seg`.
    fn dist2d_point_segment(&self, p: Coord<f64>, seg: Line<f64>) -> Result<f64, SnapError>;

    /// Projection of `p` onto `seg`, clamped to the segment's endpoints.
    fn closest_point_on_segment(&self, p: Coord<f64>, seg: Line<f64>) -> Coord<f64>;

    /// Bit-exact equality of two coordinates.
    fn point_equal(&self, a: Coord<f64>, b: Coord<f64>) -> bool;

    /// Axis-aligned bounding box of a point array. Panics if `points` is empty.
    fn bbox_of(&self, points: &[Coord<f64>]) -> Rect<f64>;

    /// Grow `rect` by `amount` on every side.
    fn bbox_expand(&self, rect: Rect<f64>, amount: f64) -> Rect<f64>;

    /// Whether every point of `seg` lies on the point-set of `edge`.
    fn covers(&self, edge: &[Coord<f64>], seg: Line<f64>) -> Result<bool, SnapError>;
}

/// Reference [`GeometryKernel`] built on closed-form 2-D geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct EuclideanKernel;

impl GeometryKernel for EuclideanKernel {
    fn dist2d_point_segment(&self, p: Coord<f64>, seg: Line<f64>) -> Result<f64, SnapError> {
        let closest = closest_point_on_segment(p, seg.start, seg.end);
        let dx = p.x - closest.x;
        let dy = p.y - closest.y;
        Ok((dx * dx + dy * dy).sqrt())
    }

    fn closest_point_on_segment(&self, p: Coord<f64>, seg: Line<f64>) -> Coord<f64> {
        closest_point_on_segment(p, seg.start, seg.end)
    }

    fn point_equal(&self, a: Coord<f64>, b: Coord<f64>) -> bool {
        a.x == b.x && a.y == b.y
    }

    fn bbox_of(&self, points: &[Coord<f64>]) -> Rect<f64> {
        let first = points[0];
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        )
    }

    fn bbox_expand(&self, rect: Rect<f64>, amount: f64) -> Rect<f64> {
        let min = rect.min();
        let max = rect.max();
        Rect::new(
            Coord {
                x: min.x - amount,
                y: min.y - amount,
            },
            Coord {
                x: max.x + amount,
                y: max.y + amount,
            },
        )
    }

    fn covers(&self, edge: &[Coord<f64>], seg: Line<f64>) -> Result<bool, SnapError> {
        use geo::{LineString, Relate};

        if edge.len() < 2 {
            return Ok(false);
        }
        let edge_ls = LineString::new(edge.to_vec());
        let seg_ls = LineString::new(vec![seg.start, seg.end]);
        Ok(edge_ls.relate(&seg_ls).is_covers())
    }
}

fn closest_point_on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a;
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2;
    let t = t.clamp(0.0, 1.0);
    Coord {
        x: a.x + t * dx,
        y: a.y + t * dy,
    }
}
