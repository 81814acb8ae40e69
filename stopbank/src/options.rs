use anyhow::Result;
use clap::{Args, Parser};
use footprint::{
    Pipeline, PipelineBuilder, Thresholds, DEFAULT_DRAPE_INTERVAL, DEFAULT_HALF_LENGTH,
    DEFAULT_SPACING, RESAMPLE_STEP,
};
use std::path::PathBuf;

/// Derive stopbank footprints from terrain profiles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub enum Cli {
    /// Cut cross-sections along a centerline, ready for draping.
    Sections(Sections),

    /// Cut cross-sections along a centerline and drape them onto a DEM.
    Drape(Drape),

    /// Find toes in draped cross-sections and assemble the footprint.
    Detect(Detect),

    /// Plot a single draped cross-section to the terminal.
    Plot(Plot),
}

#[derive(Debug, Clone, Args)]
pub struct Sections {
    /// GeoJSON file containing the centerline LineString.
    #[arg(short, long)]
    pub centerline: PathBuf,

    #[command(flatten)]
    pub section: SectionArgs,

    /// Output GeoJSON file (defaults to stdout).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct Drape {
    /// GeoJSON file containing the centerline LineString.
    #[arg(short, long)]
    pub centerline: PathBuf,

    /// Esri ASCII grid DEM, in the centerline's coordinate system.
    #[arg(short, long)]
    pub dem: PathBuf,

    /// Distance between elevation samples along each cross-section.
    #[arg(long, default_value_t = DEFAULT_DRAPE_INTERVAL)]
    pub interval: f64,

    #[command(flatten)]
    pub section: SectionArgs,

    /// Directory receiving the draped cross-section layer.
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Also find toes and assemble the footprint.
    #[arg(long)]
    pub detect: bool,

    /// Print the detection summary as JSON.
    #[arg(long, requires = "detect")]
    pub json: bool,

    #[command(flatten)]
    pub toe: ToeArgs,
}

#[derive(Debug, Clone, Args)]
pub struct Detect {
    /// GeoJSON file of draped cross-sections (3D LineStrings), in
    /// station order.
    #[arg(short, long)]
    pub profiles: PathBuf,

    /// Directory receiving the toe point and footprint layers.
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub toe: ToeArgs,
}

#[derive(Debug, Clone, Args)]
pub struct Plot {
    /// GeoJSON file of draped cross-sections (3D LineStrings).
    #[arg(short, long)]
    pub profiles: PathBuf,

    /// Zero-based position of the cross-section in `profiles`.
    #[arg(short, long, default_value_t = 0)]
    pub index: usize,

    #[command(flatten)]
    pub toe: ToeArgs,
}

/// Cross-section layout.
#[derive(Debug, Clone, Args)]
pub struct SectionArgs {
    /// Distance between cross-sections.
    #[arg(short, long, default_value_t = DEFAULT_SPACING)]
    pub spacing: f64,

    /// Length of each cross-section either side of the centerline.
    #[arg(long, default_value_t = DEFAULT_HALF_LENGTH)]
    pub half_length: f64,
}

/// Toe detection parameters.
#[derive(Debug, Clone, Args)]
pub struct ToeArgs {
    /// Maximum absolute slope at a toe, in degrees.
    #[arg(long, default_value_t = 5.0)]
    pub slope_threshold: f64,

    /// Minimum absolute change in slope (degrees) across a toe.
    #[arg(long, default_value_t = 2.0)]
    pub curvature_threshold: f64,

    /// Minimum drop from the crest to a toe.
    #[arg(long, default_value_t = 0.5)]
    pub min_elev_drop: f64,

    /// Minimum horizontal distance from the crest to a toe.
    #[arg(long, default_value_t = 2.0)]
    pub min_horiz_dist: f64,

    /// Maximum horizontal distance from the crest to a toe.
    #[arg(long, default_value_t = 15.0)]
    pub max_horiz_dist: f64,

    /// Profile resample step. Curvature scales with it.
    #[arg(long, default_value_t = RESAMPLE_STEP)]
    pub step: f64,
}

impl ToeArgs {
    /// A pipeline builder with these thresholds and step; section
    /// layout is left at its defaults.
    pub fn pipeline(&self) -> Result<PipelineBuilder> {
        let thresholds = Thresholds::builder()
            .slope_deg(self.slope_threshold)
            .curvature(self.curvature_threshold)
            .min_elev_drop(self.min_elev_drop)
            .min_horiz_dist(self.min_horiz_dist)
            .max_horiz_dist(self.max_horiz_dist)
            .build()?;
        Ok(Pipeline::builder()
            .thresholds(thresholds)
            .step(self.step))
    }
}
