//! # Stopbank footprints
//!
//! `footprint` locates the toes of an embankment in terrain profiles
//! sampled across it and stitches them into a footprint polygon.
//!
//! The flow is: [`Centerline`] → [`CrossSection`]s → drape through a
//! [`TerrainSampler`] (e.g. a [`Raster`] DEM) → [`ProfileAnalyzer`] →
//! [`assemble`] → [`Survey`], which is persisted through a
//! [`GeometryStore`] as a separate step.

mod assemble;
mod drape;
mod error;
pub mod math;
mod pipeline;
mod profile;
mod raster;
mod section;
mod store;

pub use crate::{
    assemble::{assemble, Footprint},
    drape::{SurfaceFn, TerrainSampler, DEFAULT_DRAPE_INTERVAL},
    error::FootprintError,
    math::Vertex,
    pipeline::{
        persist_profiles, LayerNames, Pipeline, PipelineBuilder, SectionResult, StationedProfile,
        Survey, DEFAULT_HALF_LENGTH, DEFAULT_SPACING,
    },
    profile::{
        Measurements, ProfileAnalyzer, SampledProfile, Side, Thresholds, ThresholdsBuilder,
        ToePair, ToePoint, RESAMPLE_STEP,
    },
    raster::Raster,
    section::{Centerline, CrossSection, TANGENT_REACH},
    store::{
        Feature, Field, FieldType, Geometry, GeometryKind, GeometryStore, Layer, MemoryStore,
        Value,
    },
};
pub use geo;

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;
