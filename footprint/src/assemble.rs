use crate::{math::Vertex, C};
use geo::{
    algorithm::Area,
    geometry::{LineString, Polygon},
};
use serde::Serialize;

/// Closed ring through every complete pair of toes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    ring: Vec<Vertex>,
    sections: usize,
}

impl Footprint {
    /// Left toes in station order, then right toes in reverse, closed
    /// on the first left toe.
    pub fn ring(&self) -> &[Vertex] {
        &self.ring
    }

    /// Number of cross-sections contributing to the ring.
    pub fn sections(&self) -> usize {
        self.sections
    }

    pub fn to_polygon(&self) -> Polygon<C> {
        Polygon::new(
            LineString::from_iter(self.ring.iter().map(Vertex::coord)),
            Vec::new(),
        )
    }

    /// Planar area enclosed by the ring.
    pub fn area(&self) -> C {
        self.to_polygon().unsigned_area()
    }
}

/// Builds the footprint ring from `(left, right)` toe pairs.
///
/// `pairs` must be in cross-section generation order; reordering them
/// produces a self-intersecting ring. Returns `None` when there are no
/// pairs.
pub fn assemble(pairs: &[(Vertex, Vertex)]) -> Option<Footprint> {
    let (first, _) = pairs.first()?;
    let ring = pairs
        .iter()
        .map(|(left, _)| *left)
        .chain(pairs.iter().rev().map(|(_, right)| *right))
        .chain(std::iter::once(*first))
        .collect();
    Some(Footprint {
        ring,
        sections: pairs.len(),
    })
}
