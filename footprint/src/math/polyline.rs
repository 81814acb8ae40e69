use crate::{
    error::too_many_samples,
    math::{stations, Vertex},
    FootprintError, C,
};
use std::slice::Windows;

/// Sum of horizontal segment lengths.
pub fn planar_length(vertices: &[Vertex]) -> C {
    vertices
        .windows(2)
        .map(|pair| pair[0].planar_distance(&pair[1]))
        .sum()
}

/// Walks a polyline by non-decreasing horizontal distance.
struct Walker<'a> {
    segments: Windows<'a, Vertex>,
    segment: Option<&'a [Vertex]>,
    walked: C,
    first: Vertex,
    last: Vertex,
}

impl<'a> Walker<'a> {
    fn new(vertices: &'a [Vertex]) -> Option<Self> {
        let (first, last) = (*vertices.first()?, *vertices.last()?);
        let mut segments = vertices.windows(2);
        let segment = segments.next();
        Some(Self {
            segments,
            segment,
            walked: 0.0,
            first,
            last,
        })
    }

    /// `distance` must not be less than on the previous call.
    fn advance(&mut self, distance: C) -> Vertex {
        if distance <= 0.0 {
            return self.first;
        }
        while let Some(pair) = self.segment {
            let len = pair[0].planar_distance(&pair[1]);
            if len > 0.0 && self.walked + len >= distance {
                return pair[0].lerp(&pair[1], (distance - self.walked) / len);
            }
            self.walked += len;
            self.segment = self.segments.next();
        }
        // Accumulated rounding can leave the final station a hair
        // beyond the last segment.
        self.last
    }
}

/// Returns the vertex `distance` units along `vertices`, measured
/// horizontally, with elevation linearly interpolated.
///
/// Distances outside the line clamp to its first/last vertex.
pub fn position_along(vertices: &[Vertex], distance: C) -> Option<Vertex> {
    Walker::new(vertices).map(|mut walker| walker.advance(distance))
}

/// Resamples `vertices` every `step` units of horizontal arc length,
/// starting at the first vertex.
///
/// Produces `floor(length / step) + 1` vertices, or none when the
/// line has no horizontal extent. Fails when `step` would produce
/// more than [`MAX_STATIONS`](super::MAX_STATIONS) vertices.
pub fn resample(vertices: &[Vertex], step: C) -> Result<Vec<Vertex>, FootprintError> {
    let length = planar_length(vertices);
    let Some(mut walker) = Walker::new(vertices) else {
        return Ok(Vec::new());
    };
    if !(length > 0.0) {
        return Ok(Vec::new());
    }
    let distances = stations(length, step).ok_or_else(|| too_many_samples("step"))?;
    Ok(distances.map(|distance| walker.advance(distance)).collect())
}
