use crate::{
    assemble::{assemble, Footprint},
    error::{require_positive, too_many_samples},
    math::stations,
    profile::{ProfileAnalyzer, SampledProfile, Thresholds, ToePair, ToePoint, RESAMPLE_STEP},
    section::{Centerline, CrossSection},
    store::{Feature, Field, Geometry, GeometryKind, GeometryStore},
    FootprintError, TerrainSampler, C,
};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Cross-section spacing used when none is given.
pub const DEFAULT_SPACING: C = 10.0;

/// Cross-section half length used when none is given.
pub const DEFAULT_HALF_LENGTH: C = 20.0;

/// A draped profile and, when known, the station it was cut at.
#[derive(Debug, Clone, PartialEq)]
pub struct StationedProfile {
    pub station: Option<C>,
    pub profile: SampledProfile,
}

/// Toes found for one cross-section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionResult {
    /// Position of the section in generation order.
    pub index: usize,

    pub station: Option<C>,

    pub toes: ToePair,
}

/// Everything derived from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Survey {
    /// Analyzed sections in station order.
    pub sections: Vec<SectionResult>,

    /// `None` when no section found toes on both sides.
    pub footprint: Option<Footprint>,

    /// Sections dropped because draping failed or produced a
    /// degenerate profile.
    pub skipped: usize,
}

/// Output layer names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNames {
    pub profiles: String,
    pub toe_points: String,
    pub footprint: String,
}

impl LayerNames {
    /// `stopbank3DLines_{suffix}`, `toePoints_{suffix}` and
    /// `stopbankFootprint_{suffix}`.
    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            profiles: format!("stopbank3DLines_{suffix}"),
            toe_points: format!("toePoints_{suffix}"),
            footprint: format!("stopbankFootprint_{suffix}"),
        }
    }
}

enum Outcome {
    Analyzed(SectionResult),
    Skipped,
}

pub struct Pipeline {
    spacing: C,
    half_length: C,
    analyzer: ProfileAnalyzer,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder {
            spacing: DEFAULT_SPACING,
            half_length: DEFAULT_HALF_LENGTH,
            step: RESAMPLE_STEP,
            thresholds: None,
        }
    }

    pub fn analyzer(&self) -> &ProfileAnalyzer {
        &self.analyzer
    }

    pub fn cross_sections(
        &self,
        centerline: &Centerline,
    ) -> Result<Vec<CrossSection>, FootprintError> {
        centerline.cross_sections(self.spacing, self.half_length)
    }

    /// Cuts cross-sections along `centerline` and drapes each one with
    /// `sampler`, in parallel, keeping station order.
    ///
    /// A section that fails to drape is logged and yields an empty
    /// profile, which [`detect`](Self::detect) skips.
    pub fn drape<S>(
        &self,
        centerline: &Centerline,
        sampler: &S,
    ) -> Result<Vec<StationedProfile>, FootprintError>
    where
        S: TerrainSampler + ?Sized,
    {
        let sections = self.cross_sections(centerline)?;

        let (profiles, runtime) = {
            let now = std::time::Instant::now();
            let profiles: Vec<StationedProfile> = sections
                .par_iter()
                .map(|section| StationedProfile {
                    station: Some(section.station),
                    profile: sampler.drape(&section.line).unwrap_or_else(|e| {
                        warn!("station {}: {e}, skipping", section.station);
                        SampledProfile::default()
                    }),
                })
                .collect();
            (profiles, now.elapsed())
        };

        debug!("drape; sections: {}, exec: {runtime:?}", sections.len());
        Ok(profiles)
    }

    /// Cuts cross-sections along `centerline`, drapes each one with
    /// `sampler` and derives toes and the footprint.
    ///
    /// Sections are processed in parallel; results keep station order.
    pub fn run<S>(&self, centerline: &Centerline, sampler: &S) -> Result<Survey, FootprintError>
    where
        S: TerrainSampler + ?Sized,
    {
        let profiles = self.drape(centerline, sampler)?;
        Ok(self.detect(&profiles))
    }

    /// Derives toes and the footprint from already draped profiles,
    /// given in station order.
    pub fn detect(&self, profiles: &[StationedProfile]) -> Survey {
        let (outcomes, runtime) = {
            let now = std::time::Instant::now();
            let outcomes: Vec<Outcome> = profiles
                .par_iter()
                .enumerate()
                .map(|(index, p)| self.section(index, p.station, &p.profile))
                .collect();
            (outcomes, now.elapsed())
        };

        debug!("detect; profiles: {}, exec: {runtime:?}", profiles.len());
        Survey::from_outcomes(outcomes)
    }

    fn section(&self, index: usize, station: Option<C>, profile: &SampledProfile) -> Outcome {
        if profile.is_degenerate() {
            warn!("section {index}: degenerate profile, skipping");
            return Outcome::Skipped;
        }
        Outcome::Analyzed(SectionResult {
            index,
            station,
            toes: self.analyzer.analyze(profile),
        })
    }
}

pub struct PipelineBuilder {
    /// Distance between cross-sections (defaults to 10).
    spacing: C,

    /// Cross-section half length (defaults to 20).
    half_length: C,

    /// Profile resample step (defaults to [`RESAMPLE_STEP`]).
    step: C,

    /// Toe acceptance criteria (required).
    thresholds: Option<Thresholds>,
}

impl PipelineBuilder {
    /// Distance between cross-sections (defaults to 10).
    #[must_use]
    pub fn spacing(mut self, spacing: C) -> Self {
        self.spacing = spacing;
        self
    }

    /// Cross-section half length (defaults to 20).
    #[must_use]
    pub fn half_length(mut self, half_length: C) -> Self {
        self.half_length = half_length;
        self
    }

    /// Profile resample step (defaults to [`RESAMPLE_STEP`]).
    #[must_use]
    pub fn step(mut self, step: C) -> Self {
        self.step = step;
        self
    }

    /// Toe acceptance criteria (required).
    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn build(&self) -> Result<Pipeline, FootprintError> {
        let thresholds = self
            .thresholds
            .ok_or(FootprintError::Builder("thresholds"))?;
        let half_length = require_positive("half_length", self.half_length)?;
        let analyzer = ProfileAnalyzer::new(thresholds).step(self.step)?;
        if stations(2.0 * half_length, self.step).is_none() {
            return Err(too_many_samples("step"));
        }
        Ok(Pipeline {
            spacing: require_positive("spacing", self.spacing)?,
            half_length,
            analyzer,
        })
    }
}

impl Survey {
    fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        let total = outcomes.len();
        let sections: Vec<SectionResult> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Outcome::Analyzed(section) => Some(section),
                Outcome::Skipped => None,
            })
            .collect();
        let skipped = total - sections.len();

        let pairs: Vec<_> = sections.iter().filter_map(|s| s.toes.complete()).collect();
        let footprint = assemble(&pairs);
        if footprint.is_none() {
            warn!("no section has toes on both sides, no footprint");
        }

        info!(
            "sections: {total}, skipped: {skipped}, toes: {}, complete: {}",
            sections.iter().map(|s| s.toes.iter().count()).sum::<usize>(),
            pairs.len()
        );

        Self {
            sections,
            footprint,
            skipped,
        }
    }

    /// Every toe found, with the section it belongs to.
    pub fn toe_points(&self) -> impl Iterator<Item = (&SectionResult, &ToePoint)> {
        self.sections
            .iter()
            .flat_map(|section| section.toes.iter().map(move |toe| (section, toe)))
    }

    /// Number of sections contributing to the footprint.
    pub fn complete_sections(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.toes.complete().is_some())
            .count()
    }

    /// Writes toe points and, when present, the footprint to `store`.
    ///
    /// The footprint layer is only created when there is a footprint.
    pub fn persist<S>(&self, store: &mut S, names: &LayerNames) -> Result<(), FootprintError>
    where
        S: GeometryStore + ?Sized,
    {
        store.create_layer(
            &names.toe_points,
            GeometryKind::Point,
            &[
                Field::text("Side"),
                Field::double("SlopeDeg"),
                Field::double("Curvature"),
                Field::double("DistCrest"),
                Field::double("ElevDrop"),
                Field::double("Station"),
            ],
        )?;
        for (section, toe) in self.toe_points() {
            let mut feature = Feature::new(Geometry::Point(toe.position))
                .with("Side", toe.side.as_str())
                .with("SlopeDeg", toe.slope_deg)
                .with("Curvature", toe.curvature)
                .with("DistCrest", toe.distance_from_crest)
                .with("ElevDrop", toe.elevation_drop);
            if let Some(station) = section.station {
                feature = feature.with("Station", station);
            }
            store.insert(&names.toe_points, feature)?;
        }

        if let Some(footprint) = &self.footprint {
            store.create_layer(
                &names.footprint,
                GeometryKind::Polygon,
                &[Field::double("Area"), Field::double("Sections")],
            )?;
            #[allow(clippy::cast_precision_loss)]
            let feature = Feature::new(Geometry::Polygon(footprint.ring().to_vec()))
                .with("Area", footprint.area())
                .with("Sections", footprint.sections() as C);
            store.insert(&names.footprint, feature)?;
        }

        Ok(())
    }
}

/// Writes draped profiles to `layer` as 3D polylines with their
/// station.
///
/// Profiles with fewer than two vertices have no line to write and are
/// left out.
pub fn persist_profiles<S>(
    profiles: &[StationedProfile],
    store: &mut S,
    layer: &str,
) -> Result<(), FootprintError>
where
    S: GeometryStore + ?Sized,
{
    store.create_layer(layer, GeometryKind::Polyline, &[Field::double("Station")])?;
    for stationed in profiles {
        if stationed.profile.vertices.len() < 2 {
            debug!("station {:?}: nothing draped, not written", stationed.station);
            continue;
        }
        let mut feature = Feature::new(Geometry::Polyline(stationed.profile.vertices.clone()));
        if let Some(station) = stationed.station {
            feature = feature.with("Station", station);
        }
        store.insert(layer, feature)?;
    }
    Ok(())
}
