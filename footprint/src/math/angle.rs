use crate::{math::Vertex, C};
use geo::Coord;

/// Returns the signed slope, in degrees, going from `a` to `b`.
///
/// Vertices sharing a planar position have no run; their slope is
/// reported as `0`.
pub fn slope_deg(a: &Vertex, b: &Vertex) -> C {
    let run = a.planar_distance(b);
    if run > 0.0 {
        (b.z - a.z).atan2(run).to_degrees()
    } else {
        0.0
    }
}

/// Returns the planar heading (in radians, counter-clockwise from +x)
/// from `from` to `to`.
pub fn heading(from: Coord<C>, to: Coord<C>) -> C {
    (to.y - from.y).atan2(to.x - from.x)
}
