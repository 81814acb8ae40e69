//! Cross-section generation along a centerline.

use crate::{
    error::{require_positive, too_many_samples},
    math::{heading, stations},
    FootprintError, C,
};
use geo::{
    algorithm::{EuclideanLength, LineInterpolatePoint},
    geometry::{Coord, Line, LineString},
};
use log::{debug, warn};
use std::f64::consts::FRAC_PI_2;

/// Distance along the centerline used to estimate its tangent.
pub const TANGENT_REACH: C = 1.0;

/// The embankment centerline.
#[derive(Debug, Clone, PartialEq)]
pub struct Centerline {
    line: LineString<C>,
    length: C,
}

impl Centerline {
    pub fn new(line: LineString<C>) -> Result<Self, FootprintError> {
        if line.0.len() < 2 {
            return Err(FootprintError::Centerline("fewer than two vertices"));
        }
        if line.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(FootprintError::Centerline("non-finite coordinate"));
        }
        let length = line.euclidean_length();
        if !(length > 0.0) {
            return Err(FootprintError::Centerline("zero length"));
        }
        Ok(Self { line, length })
    }

    pub fn line(&self) -> &LineString<C> {
        &self.line
    }

    /// Planar length.
    pub fn length(&self) -> C {
        self.length
    }

    /// Returns the position `distance` units along the centerline,
    /// clamped to its ends.
    pub fn point_at(&self, distance: C) -> Coord<C> {
        let fraction = (distance / self.length).clamp(0.0, 1.0);
        match self.line.line_interpolate_point(fraction) {
            Some(point) => point.0,
            // Rounding in the cumulative length can overshoot the
            // final segment.
            None if fraction > 0.0 => self.line.0[self.line.0.len() - 1],
            None => self.line.0[0],
        }
    }

    /// Unit normal at `station`, pointing to the left of the direction
    /// of travel.
    ///
    /// The tangent is the chord to the point [`TANGENT_REACH`] further
    /// along. Stations closer than that to the end look back instead,
    /// and centerlines shorter than the reach use their end-to-end
    /// chord. Returns `None` when the chord has no planar extent.
    pub fn normal_at(&self, station: C) -> Option<(C, C)> {
        let (from, to) = if self.length < TANGENT_REACH {
            (0.0, self.length)
        } else if station + TANGENT_REACH <= self.length {
            (station, station + TANGENT_REACH)
        } else {
            (station - TANGENT_REACH, station)
        };
        let (a, b) = (self.point_at(from), self.point_at(to));
        if (b.x - a.x).hypot(b.y - a.y) > 0.0 {
            let (sin, cos) = (heading(a, b) + FRAC_PI_2).sin_cos();
            Some((cos, sin))
        } else {
            None
        }
    }

    /// Builds one cross-section every `spacing` units, starting at the
    /// first vertex, each `2 * half_length` long and centered on the
    /// centerline.
    pub fn cross_sections(
        &self,
        spacing: C,
        half_length: C,
    ) -> Result<Vec<CrossSection>, FootprintError> {
        let spacing = require_positive("spacing", spacing)?;
        let half_length = require_positive("half_length", half_length)?;

        let stations = stations(self.length, spacing).ok_or_else(|| too_many_samples("spacing"))?;
        let mut sections = Vec::new();
        for station in stations {
            let Some((nx, ny)) = self.normal_at(station) else {
                warn!("no tangent at station {station}, skipping cross-section");
                continue;
            };
            let center = self.point_at(station);
            let offset = Coord {
                x: nx * half_length,
                y: ny * half_length,
            };
            sections.push(CrossSection {
                station,
                line: Line::new(center - offset, center + offset),
            });
        }

        debug!(
            "cross_sections; length: {}, spacing: {spacing}, half_length: {half_length}, count: {}",
            self.length,
            sections.len()
        );
        Ok(sections)
    }
}

impl TryFrom<LineString<C>> for Centerline {
    type Error = FootprintError;

    fn try_from(line: LineString<C>) -> Result<Self, Self::Error> {
        Self::new(line)
    }
}

/// A segment perpendicular to the centerline at `station`.
///
/// `line.start` lies to the right of the direction of travel and is
/// the start of the draped profile, i.e. its [`Side::Left`] half.
///
/// [`Side::Left`]: crate::Side::Left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSection {
    /// Distance along the centerline.
    pub station: C,

    pub line: Line<C>,
}

impl CrossSection {
    pub fn center(&self) -> Coord<C> {
        Coord {
            x: (self.line.start.x + self.line.end.x) / 2.0,
            y: (self.line.start.y + self.line.end.y) / 2.0,
        }
    }

    pub fn length(&self) -> C {
        self.line.euclidean_length()
    }
}
