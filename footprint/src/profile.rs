use crate::{
    error::require_positive,
    math::{planar_length, resample, slope_deg, Vertex},
    FootprintError, C,
};
use log::warn;
use serde::Serialize;
use std::fmt;

/// Arc-length step used to resample draped profiles.
pub const RESAMPLE_STEP: C = 0.5;

/// Elevation-bearing vertices along one cross-section, in draping
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledProfile {
    pub vertices: Vec<Vertex>,
}

impl SampledProfile {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Horizontal length.
    pub fn length(&self) -> C {
        planar_length(&self.vertices)
    }

    /// Profiles without horizontal extent carry no slope information.
    pub fn is_degenerate(&self) -> bool {
        !(self.length() > 0.0)
    }
}

impl From<Vec<Vertex>> for SampledProfile {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self::new(vertices)
    }
}

/// Which half of a profile a toe was found in.
///
/// `Left` is the half before the crest in draping order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an embankment side slope meets the surrounding ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToePoint {
    pub side: Side,

    pub position: Vertex,

    /// Slope at the toe, in degrees.
    pub slope_deg: C,

    /// Change in slope (degrees) across the toe, see
    /// [`Measurements::curvatures`].
    pub curvature: C,

    /// Horizontal distance to the crest.
    pub distance_from_crest: C,

    /// Crest elevation minus toe elevation.
    pub elevation_drop: C,
}

/// Toes found on either side of a single profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ToePair {
    pub left: Option<ToePoint>,
    pub right: Option<ToePoint>,
}

impl ToePair {
    /// Positions of both toes, if both were found.
    pub fn complete(&self) -> Option<(Vertex, Vertex)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((left.position, right.position)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToePoint> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Acceptance criteria for a toe candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    slope_deg: C,
    curvature: C,
    min_elev_drop: C,
    min_horiz_dist: C,
    max_horiz_dist: C,
}

impl Thresholds {
    pub fn builder() -> ThresholdsBuilder {
        ThresholdsBuilder {
            slope_deg: None,
            curvature: None,
            min_elev_drop: None,
            min_horiz_dist: None,
            max_horiz_dist: None,
        }
    }

    pub fn slope_deg(&self) -> C {
        self.slope_deg
    }

    pub fn curvature(&self) -> C {
        self.curvature
    }

    pub fn min_elev_drop(&self) -> C {
        self.min_elev_drop
    }

    pub fn min_horiz_dist(&self) -> C {
        self.min_horiz_dist
    }

    pub fn max_horiz_dist(&self) -> C {
        self.max_horiz_dist
    }

    /// All four criteria are strict inequalities.
    pub fn accepts(&self, slope_deg: C, curvature: C, elevation_drop: C, distance: C) -> bool {
        slope_deg.abs() < self.slope_deg
            && curvature.abs() > self.curvature
            && elevation_drop > self.min_elev_drop
            && self.min_horiz_dist < distance
            && distance < self.max_horiz_dist
    }
}

pub struct ThresholdsBuilder {
    /// Maximum absolute slope at the toe, degrees (required).
    slope_deg: Option<C>,

    /// Minimum absolute change in slope at the toe (required).
    curvature: Option<C>,

    /// Minimum drop from crest to toe (required).
    min_elev_drop: Option<C>,

    /// Exclusive lower bound on crest-to-toe distance (required).
    min_horiz_dist: Option<C>,

    /// Exclusive upper bound on crest-to-toe distance (required).
    max_horiz_dist: Option<C>,
}

impl ThresholdsBuilder {
    /// Maximum absolute slope at the toe, degrees (required).
    #[must_use]
    pub fn slope_deg(mut self, degrees: C) -> Self {
        self.slope_deg = Some(degrees);
        self
    }

    /// Minimum absolute change in slope at the toe (required).
    #[must_use]
    pub fn curvature(mut self, curvature: C) -> Self {
        self.curvature = Some(curvature);
        self
    }

    /// Minimum drop from crest to toe (required).
    #[must_use]
    pub fn min_elev_drop(mut self, drop: C) -> Self {
        self.min_elev_drop = Some(drop);
        self
    }

    /// Exclusive lower bound on crest-to-toe distance (required).
    #[must_use]
    pub fn min_horiz_dist(mut self, distance: C) -> Self {
        self.min_horiz_dist = Some(distance);
        self
    }

    /// Exclusive upper bound on crest-to-toe distance (required).
    #[must_use]
    pub fn max_horiz_dist(mut self, distance: C) -> Self {
        self.max_horiz_dist = Some(distance);
        self
    }

    pub fn build(&self) -> Result<Thresholds, FootprintError> {
        let slope_deg = self.slope_deg.ok_or(FootprintError::Builder("slope_deg"))?;
        let curvature = self.curvature.ok_or(FootprintError::Builder("curvature"))?;
        let min_elev_drop = self
            .min_elev_drop
            .ok_or(FootprintError::Builder("min_elev_drop"))?;
        let min_horiz_dist = self
            .min_horiz_dist
            .ok_or(FootprintError::Builder("min_horiz_dist"))?;
        let max_horiz_dist = self
            .max_horiz_dist
            .ok_or(FootprintError::Builder("max_horiz_dist"))?;

        for (name, value) in [
            ("slope_deg", slope_deg),
            ("curvature", curvature),
            ("min_elev_drop", min_elev_drop),
            ("min_horiz_dist", min_horiz_dist),
            ("max_horiz_dist", max_horiz_dist),
        ] {
            if !value.is_finite() {
                return Err(FootprintError::InvalidParameter {
                    name,
                    reason: "must be finite",
                });
            }
        }
        if min_horiz_dist >= max_horiz_dist {
            return Err(FootprintError::InvalidParameter {
                name: "max_horiz_dist",
                reason: "must exceed min_horiz_dist",
            });
        }

        Ok(Thresholds {
            slope_deg,
            curvature,
            min_elev_drop,
            min_horiz_dist,
            max_horiz_dist,
        })
    }
}

/// Intermediate values computed for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    /// The profile resampled at a fixed step.
    pub vertices: Vec<Vertex>,

    /// `slopes[i]` is the slope (degrees) across `vertices[i + 1]`,
    /// from its predecessor to its successor.
    pub slopes: Vec<C>,

    /// `curvatures[j]` is `slopes[j + 2] - slopes[j]`, the change in
    /// slope across `vertices[j + 2]`.
    ///
    /// This is a second difference over the resample step, not a
    /// geometric curvature; its magnitude scales with the step.
    pub curvatures: Vec<C>,

    /// Index of the crest in `vertices`.
    pub crest: usize,
}

impl Measurements {
    pub fn crest_vertex(&self) -> &Vertex {
        &self.vertices[self.crest]
    }

    /// Slope centered on `vertices[index]`.
    pub fn slope_at(&self, index: usize) -> Option<C> {
        index
            .checked_sub(1)
            .and_then(|i| self.slopes.get(i))
            .copied()
    }

    /// Curvature centered on `vertices[index]`.
    pub fn curvature_at(&self, index: usize) -> Option<C> {
        index
            .checked_sub(2)
            .and_then(|j| self.curvatures.get(j))
            .copied()
    }
}

/// Classifies toe points in draped profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileAnalyzer {
    thresholds: Thresholds,
    step: C,
}

impl ProfileAnalyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            step: RESAMPLE_STEP,
        }
    }

    /// Overrides the resample step (defaults to [`RESAMPLE_STEP`]).
    ///
    /// Curvature values scale with the step, so curvature thresholds
    /// tuned for one step do not carry over to another.
    pub fn step(mut self, step: C) -> Result<Self, FootprintError> {
        self.step = require_positive("step", step)?;
        Ok(self)
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Resamples `profile` and computes its slopes and curvatures.
    ///
    /// Returns `None` for degenerate profiles, and for profiles so long
    /// that resampling them would exceed
    /// [`MAX_STATIONS`](crate::math::MAX_STATIONS) vertices.
    pub fn measure(&self, profile: &SampledProfile) -> Option<Measurements> {
        let vertices = match resample(&profile.vertices, self.step) {
            Ok(vertices) if !vertices.is_empty() => vertices,
            Ok(_) => return None,
            Err(e) => {
                warn!("profile of length {}: {e}", profile.length());
                return None;
            }
        };
        let slopes: Vec<C> = vertices
            .windows(3)
            .map(|w| slope_deg(&w[0], &w[2]))
            .collect();
        let curvatures: Vec<C> = slopes.windows(3).map(|w| w[2] - w[0]).collect();
        // Assumed, not derived from elevation.
        let crest = vertices.len() / 2;
        Some(Measurements {
            vertices,
            slopes,
            curvatures,
            crest,
        })
    }

    /// Finds at most one toe on each side of the crest.
    pub fn analyze(&self, profile: &SampledProfile) -> ToePair {
        self.measure(profile)
            .map(|measurements| self.classify(&measurements))
            .unwrap_or_default()
    }

    /// Toe search over precomputed measurements.
    ///
    /// Each side is scanned outward from the crest and the first
    /// candidate passing every threshold wins, even if a better one
    /// lies further out.
    pub fn classify(&self, m: &Measurements) -> ToePair {
        if m.curvatures.is_empty() {
            return ToePair::default();
        }
        // Vertices carrying a curvature value.
        let (first, last) = (2, m.vertices.len() - 3);
        ToePair {
            left: (first..m.crest)
                .rev()
                .find_map(|index| self.candidate(m, index, Side::Left)),
            right: (m.crest + 1..=last).find_map(|index| self.candidate(m, index, Side::Right)),
        }
    }

    fn candidate(&self, m: &Measurements, index: usize, side: Side) -> Option<ToePoint> {
        let slope_deg = m.slope_at(index)?;
        let curvature = m.curvature_at(index)?;
        let crest = m.crest_vertex();
        let position = m.vertices[index];
        let elevation_drop = crest.z - position.z;
        let distance_from_crest = crest.planar_distance(&position);
        self.thresholds
            .accepts(slope_deg, curvature, elevation_drop, distance_from_crest)
            .then_some(ToePoint {
                side,
                position,
                slope_deg,
                curvature,
                distance_from_crest,
                elevation_drop,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ProfileAnalyzer, SampledProfile, Side, Thresholds, RESAMPLE_STEP};
    use crate::{math::Vertex, FootprintError};
    use approx::assert_relative_eq;

    fn thresholds() -> Thresholds {
        Thresholds::builder()
            .slope_deg(5.0)
            .curvature(2.0)
            .min_elev_drop(0.5)
            .min_horiz_dist(2.0)
            .max_horiz_dist(15.0)
            .build()
            .unwrap()
    }

    /// Profile along +x from `-20` to `20`, built from breakpoints.
    fn profile(breaks: &[(f64, f64)]) -> SampledProfile {
        breaks
            .iter()
            .map(|&(x, z)| Vertex::new(x, 0.0, z))
            .collect::<Vec<_>>()
            .into()
    }

    /// Crest at 5, falling linearly to 0 at 8 units either side.
    fn levee() -> SampledProfile {
        profile(&[
            (-20.0, 0.0),
            (-8.0, 0.0),
            (0.0, 5.0),
            (8.0, 0.0),
            (20.0, 0.0),
        ])
    }

    #[test]
    fn test_levee_toes() {
        let toes = ProfileAnalyzer::new(thresholds()).analyze(&levee());
        let left = toes.left.expect("left toe");
        let right = toes.right.expect("right toe");

        assert_eq!(left.side, Side::Left);
        assert_eq!(right.side, Side::Right);
        for toe in [left, right] {
            assert!((toe.distance_from_crest - 8.0).abs() <= RESAMPLE_STEP + 1e-9);
            assert_relative_eq!(toe.elevation_drop, 5.0, epsilon = 1e-9);
            assert!(toe.slope_deg.abs() < 5.0);
            assert!(toe.curvature.abs() > 2.0);
        }
        assert_relative_eq!(left.position.x, -right.position.x, epsilon = 1e-9);
        assert_relative_eq!(
            left.distance_from_crest,
            right.distance_from_crest,
            epsilon = 1e-9
        );
        assert!(toes.complete().is_some());
    }

    #[test]
    fn test_trapezoid_is_symmetric() {
        // Flat crest 4 wide, 1:2 batters, flat ground beyond.
        let trapezoid = profile(&[
            (-20.0, 0.0),
            (-8.0, 0.0),
            (-2.0, 3.0),
            (2.0, 3.0),
            (8.0, 0.0),
            (20.0, 0.0),
        ]);
        let toes = ProfileAnalyzer::new(thresholds()).analyze(&trapezoid);
        let (left, right) = (toes.left.unwrap(), toes.right.unwrap());
        assert_relative_eq!(
            left.distance_from_crest,
            right.distance_from_crest,
            epsilon = 1e-9
        );
        assert!((left.distance_from_crest - 8.0).abs() <= RESAMPLE_STEP + 1e-9);
    }

    #[test]
    fn test_monotonic_side_has_no_toe() {
        // Right side keeps falling to the end of the profile.
        let lopsided = profile(&[(-20.0, 0.0), (-8.0, 0.0), (0.0, 5.0), (20.0, -10.0)]);
        let toes = ProfileAnalyzer::new(thresholds()).analyze(&lopsided);
        assert!(toes.left.is_some());
        assert!(toes.right.is_none());
        assert!(toes.complete().is_none());
        assert_eq!(toes.iter().count(), 1);
    }

    #[test]
    fn test_first_candidate_wins() {
        // Two benches on the right; the nearer one is taken even
        // though the further one drops more.
        let benched = profile(&[
            (-20.0, 0.0),
            (-8.0, 0.0),
            (0.0, 5.0),
            (4.0, 2.0),
            (7.0, 2.0),
            (10.0, -1.0),
            (20.0, -1.0),
        ]);
        let toes = ProfileAnalyzer::new(thresholds()).analyze(&benched);
        let right = toes.right.unwrap();
        assert!(right.position.x < 7.0);
        assert_relative_eq!(right.elevation_drop, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_short_for_slopes() {
        let analyzer = ProfileAnalyzer::new(thresholds());
        let stub = profile(&[(0.0, 0.0), (0.6, 1.0)]);
        let m = analyzer.measure(&stub).unwrap();
        assert_eq!(m.vertices.len(), 2);
        assert!(m.slopes.is_empty());
        assert!(m.curvatures.is_empty());
        assert_eq!(analyzer.analyze(&stub), Default::default());
    }

    #[test]
    fn test_too_short_for_curvature() {
        let analyzer = ProfileAnalyzer::new(thresholds());
        let stub = profile(&[(0.0, 0.0), (1.9, 1.0)]);
        let m = analyzer.measure(&stub).unwrap();
        assert_eq!(m.vertices.len(), 4);
        assert_eq!(m.slopes.len(), 2);
        assert!(m.curvatures.is_empty());
        assert_eq!(analyzer.analyze(&stub), Default::default());
    }

    #[test]
    fn test_measurement_lengths() {
        let m = ProfileAnalyzer::new(thresholds()).measure(&levee()).unwrap();
        assert_eq!(m.vertices.len(), 81);
        assert_eq!(m.slopes.len(), 79);
        assert_eq!(m.curvatures.len(), 77);
        assert_eq!(m.crest, 40);
        assert_relative_eq!(m.crest_vertex().z, 5.0, epsilon = 1e-9);
        assert_eq!(m.slope_at(0), None);
        assert_eq!(m.curvature_at(1), None);
        assert_eq!(m.curvature_at(79), None);
    }

    #[test]
    fn test_degenerate_profile() {
        let analyzer = ProfileAnalyzer::new(thresholds());
        assert!(analyzer.measure(&SampledProfile::default()).is_none());
        let pinned = profile(&[(3.0, 0.0), (3.0, 9.0)]);
        assert!(pinned.is_degenerate());
        assert!(analyzer.measure(&pinned).is_none());
    }

    #[test]
    fn test_negative_thresholds_are_plain_bounds() {
        // A negative drop accepts toes above the crest elevation; a
        // negative curvature bound accepts any change in slope.
        let loose = Thresholds::builder()
            .slope_deg(5.0)
            .curvature(-1.0)
            .min_elev_drop(-1.0)
            .min_horiz_dist(2.0)
            .max_horiz_dist(15.0)
            .build()
            .unwrap();
        assert!(loose.accepts(0.0, 0.0, -0.5, 5.0));
        assert!(!thresholds().accepts(0.0, 0.0, -0.5, 5.0));
    }

    #[test]
    fn test_step_too_small_for_profile() {
        let analyzer = ProfileAnalyzer::new(thresholds()).step(1e-9).unwrap();
        assert!(analyzer.measure(&levee()).is_none());
        assert_eq!(analyzer.analyze(&levee()), Default::default());
    }

    #[test]
    fn test_thresholds_builder() {
        assert!(matches!(
            Thresholds::builder().slope_deg(5.0).build(),
            Err(FootprintError::Builder("curvature"))
        ));
        assert!(matches!(
            Thresholds::builder()
                .slope_deg(5.0)
                .curvature(2.0)
                .min_elev_drop(0.5)
                .min_horiz_dist(15.0)
                .max_horiz_dist(2.0)
                .build(),
            Err(FootprintError::InvalidParameter {
                name: "max_horiz_dist",
                ..
            })
        ));
        assert!(matches!(
            Thresholds::builder()
                .slope_deg(5.0)
                .curvature(2.0)
                .min_elev_drop(f64::NAN)
                .min_horiz_dist(2.0)
                .max_horiz_dist(15.0)
                .build(),
            Err(FootprintError::InvalidParameter {
                name: "min_elev_drop",
                ..
            })
        ));
        assert!(matches!(
            ProfileAnalyzer::new(thresholds()).step(-0.5),
            Err(FootprintError::InvalidParameter { name: "step", .. })
        ));
    }
}
