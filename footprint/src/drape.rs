//! Draping cross-sections onto terrain.

use crate::{
    error::{require_positive, too_many_samples},
    math::{stations, Vertex},
    FootprintError, SampledProfile, C,
};
use geo::{
    algorithm::EuclideanLength,
    geometry::{Coord, Line},
};

/// Spacing between drape samples used by [`SurfaceFn`].
pub const DEFAULT_DRAPE_INTERVAL: C = 1.0;

/// Anything that can drape a planar segment onto a terrain surface.
///
/// Implementations must be `Sync`; sections are draped in parallel.
pub trait TerrainSampler: Sync {
    /// Returns the profile of `line` over the terrain, starting at
    /// `line.start`.
    ///
    /// An empty profile is not an error; callers skip it.
    fn drape(&self, line: &Line<C>) -> Result<SampledProfile, FootprintError>;
}

impl<T: TerrainSampler + ?Sized> TerrainSampler for &T {
    fn drape(&self, line: &Line<C>) -> Result<SampledProfile, FootprintError> {
        (**self).drape(line)
    }
}

/// Drapes against a surface function returning the elevation at a
/// planar coordinate, or `None` where the surface has no data.
///
/// Samples every `interval` units plus the segment end. Samples
/// without data are dropped.
pub struct SurfaceFn<F> {
    surface: F,
    interval: C,
}

impl<F> SurfaceFn<F>
where
    F: Fn(Coord<C>) -> Option<C> + Sync,
{
    pub fn new(surface: F) -> Self {
        Self {
            surface,
            interval: DEFAULT_DRAPE_INTERVAL,
        }
    }

    pub fn interval(mut self, interval: C) -> Result<Self, FootprintError> {
        self.interval = require_positive("interval", interval)?;
        Ok(self)
    }
}

impl<F> TerrainSampler for SurfaceFn<F>
where
    F: Fn(Coord<C>) -> Option<C> + Sync,
{
    fn drape(&self, line: &Line<C>) -> Result<SampledProfile, FootprintError> {
        drape_with(line, self.interval, &self.surface)
    }
}

/// Samples `surface` every `interval` units along `line`, plus its end
/// point, dropping samples without data.
pub(crate) fn drape_with<F>(
    line: &Line<C>,
    interval: C,
    surface: F,
) -> Result<SampledProfile, FootprintError>
where
    F: Fn(Coord<C>) -> Option<C>,
{
    let length = line.euclidean_length();
    if !length.is_finite() {
        return Err(FootprintError::Drape(format!("non-finite segment {line:?}")));
    }
    if length == 0.0 {
        return Ok(SampledProfile::default());
    }

    let delta = line.delta();
    let at = |distance: C| line.start + delta * (distance / length);

    let mut distances: Vec<C> = stations(length, interval)
        .ok_or_else(|| too_many_samples("interval"))?
        .collect();
    if distances.last().map_or(true, |last| *last < length) {
        distances.push(length);
    }

    let vertices = distances
        .into_iter()
        .map(at)
        .filter_map(|coord| surface(coord).map(|z| Vertex::from_coord(coord, z)))
        .collect::<Vec<_>>();
    Ok(SampledProfile::new(vertices))
}
