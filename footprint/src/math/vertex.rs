use crate::C;
use geo::Coord;
use serde::Serialize;

/// A planar position carrying an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub x: C,
    pub y: C,
    pub z: C,
}

impl Vertex {
    pub const fn new(x: C, y: C, z: C) -> Self {
        Self { x, y, z }
    }

    /// Lifts a planar coordinate to elevation `z`.
    pub fn from_coord(Coord { x, y }: Coord<C>, z: C) -> Self {
        Self { x, y, z }
    }

    /// Drops elevation.
    pub fn coord(&self) -> Coord<C> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// Horizontal distance, ignoring elevation.
    pub fn planar_distance(&self, other: &Self) -> C {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other`, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &Self, t: C) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl From<Vertex> for Coord<C> {
    fn from(vertex: Vertex) -> Self {
        vertex.coord()
    }
}
