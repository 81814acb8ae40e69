//! Gridded elevation models.
//!
//! # References
//!
//! 1. [Esri ASCII raster format](https://desktop.arcgis.com/en/arcmap/latest/manage-data/raster-and-images/esri-ascii-raster-format.htm)

use crate::{
    drape::{drape_with, DEFAULT_DRAPE_INTERVAL},
    error::require_positive,
    FootprintError, SampledProfile, TerrainSampler, C,
};
use geo::geometry::{Coord, Line};
use log::debug;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// A regular grid of elevation samples in the same planar units as
/// the centerline.
pub struct Raster {
    /// Center of the southwest most sample.
    sw_corner_center: Coord<C>,

    /// Distance between adjacent sample centers.
    cell_size: C,

    /// Number of (columns, rows).
    dimensions: (usize, usize),

    /// Elevation samples, northern row first, `NaN` where the source
    /// has no data.
    samples: Box<[C]>,

    /// Drape sample spacing.
    interval: C,
}

impl Raster {
    /// `samples` are in row-major order starting from the northwest
    /// corner.
    pub fn new(
        sw_corner_center: Coord<C>,
        cell_size: C,
        (cols, rows): (usize, usize),
        samples: Vec<C>,
    ) -> Result<Self, FootprintError> {
        let cell_size = require_positive("cell_size", cell_size)?;
        if cols < 2 || rows < 2 {
            return Err(FootprintError::Raster(format!(
                "need at least 2x2 samples, got {cols}x{rows}"
            )));
        }
        if samples.len() != cols * rows {
            return Err(FootprintError::Raster(format!(
                "expected {} samples, got {}",
                cols * rows,
                samples.len()
            )));
        }
        if !sw_corner_center.x.is_finite() || !sw_corner_center.y.is_finite() {
            return Err(FootprintError::Raster("non-finite origin".into()));
        }
        Ok(Self {
            sw_corner_center,
            cell_size,
            dimensions: (cols, rows),
            samples: samples.into_boxed_slice(),
            interval: DEFAULT_DRAPE_INTERVAL,
        })
    }

    /// Reads an Esri ASCII grid from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FootprintError> {
        let now = std::time::Instant::now();
        let raster = Self::parse_ascii_grid(BufReader::new(File::open(&path)?))?;
        debug!(
            "load; path: {:?}, dimensions: {:?}, exec: {:?}",
            path.as_ref(),
            raster.dimensions,
            now.elapsed()
        );
        Ok(raster)
    }

    /// Parses an Esri ASCII grid.
    ///
    /// Header keys are case-insensitive. Either `xllcorner`/`yllcorner`
    /// or `xllcenter`/`yllcenter` locate the grid; `nodata_value` is
    /// optional.
    pub fn parse_ascii_grid<R: Read>(mut rdr: R) -> Result<Self, FootprintError> {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;
        let mut tokens = text.split_whitespace().peekable();

        let mut header = Header::default();
        while let Some(key) = tokens.next_if(|token| token.parse::<C>().is_err()) {
            let value = tokens
                .next()
                .ok_or_else(|| FootprintError::Raster(format!("no value for '{key}'")))?;
            header.set(key, value)?;
        }
        let (cols, rows, cell_size, sw_corner_center, nodata) = header.finish()?;

        let samples = tokens
            .map(|token| match token.parse::<C>() {
                Ok(z) if Some(z) == nodata => Ok(C::NAN),
                Ok(z) => Ok(z),
                Err(_) => Err(FootprintError::Raster(format!("bad sample '{token}'"))),
            })
            .collect::<Result<Vec<C>, _>>()?;

        Self::new(sw_corner_center, cell_size, (cols, rows), samples)
    }

    /// Drape sample spacing (defaults to [`DEFAULT_DRAPE_INTERVAL`]).
    pub fn interval(mut self, interval: C) -> Result<Self, FootprintError> {
        self.interval = require_positive("interval", interval)?;
        Ok(self)
    }

    /// Number of (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn cell_size(&self) -> C {
        self.cell_size
    }

    /// Bilinearly interpolated elevation at `coord`.
    ///
    /// Returns `None` outside the hull of sample centers, or when any
    /// of the four surrounding samples has no data.
    pub fn elevation(&self, coord: Coord<C>) -> Option<C> {
        let (cols, rows) = self.dimensions;
        let fx = (coord.x - self.sw_corner_center.x) / self.cell_size;
        let fy = (coord.y - self.sw_corner_center.y) / self.cell_size;
        #[allow(clippy::cast_precision_loss)]
        let (max_x, max_y) = ((cols - 1) as C, (rows - 1) as C);
        if !(0.0..=max_x).contains(&fx) || !(0.0..=max_y).contains(&fy) {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y) = (
            (fx.floor() as usize).min(cols - 2),
            (fy.floor() as usize).min(rows - 2),
        );
        #[allow(clippy::cast_precision_loss)]
        let (tx, ty) = (fx - x as C, fy - y as C);

        let sw = self.get_xy((x, y));
        let se = self.get_xy((x + 1, y));
        let nw = self.get_xy((x, y + 1));
        let ne = self.get_xy((x + 1, y + 1));
        let south = sw + (se - sw) * tx;
        let north = nw + (ne - nw) * tx;
        let z = south + (north - south) * ty;
        z.is_finite().then_some(z)
    }
}

/// Private API
impl Raster {
    /// `y` counts rows from the south.
    fn get_xy(&self, (x, y): (usize, usize)) -> C {
        self.samples[self.xy_to_linear_index((x, y))]
    }

    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        let (cols, rows) = self.dimensions;
        cols * (rows - y - 1) + x
    }
}

impl TerrainSampler for Raster {
    fn drape(&self, line: &Line<C>) -> Result<SampledProfile, FootprintError> {
        drape_with(line, self.interval, |coord| self.elevation(coord))
    }
}

#[derive(Default)]
struct Header {
    cols: Option<usize>,
    rows: Option<usize>,
    x: Option<(C, bool)>,
    y: Option<(C, bool)>,
    cell_size: Option<C>,
    nodata: Option<C>,
}

impl Header {
    fn set(&mut self, key: &str, value: &str) -> Result<(), FootprintError> {
        let bad = || FootprintError::Raster(format!("bad value '{value}' for '{key}'"));
        let number = || value.parse::<C>().map_err(|_| bad());
        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.cols = Some(value.parse().map_err(|_| bad())?),
            "nrows" => self.rows = Some(value.parse().map_err(|_| bad())?),
            "xllcorner" => self.x = Some((number()?, true)),
            "yllcorner" => self.y = Some((number()?, true)),
            "xllcenter" => self.x = Some((number()?, false)),
            "yllcenter" => self.y = Some((number()?, false)),
            "cellsize" => self.cell_size = Some(number()?),
            "nodata_value" => self.nodata = Some(number()?),
            _ => return Err(FootprintError::Raster(format!("unknown header '{key}'"))),
        }
        Ok(())
    }

    /// `(cols, rows, cell_size, sw_corner_center, nodata)`
    #[allow(clippy::type_complexity)]
    fn finish(self) -> Result<(usize, usize, C, Coord<C>, Option<C>), FootprintError> {
        let missing = |key| FootprintError::Raster(format!("missing header '{key}'"));
        let cols = self.cols.ok_or_else(|| missing("ncols"))?;
        let rows = self.rows.ok_or_else(|| missing("nrows"))?;
        let cell_size = self.cell_size.ok_or_else(|| missing("cellsize"))?;
        let (x, x_corner) = self.x.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_corner) = self.y.ok_or_else(|| missing("yllcorner"))?;
        let center = |value: C, corner: bool| {
            if corner {
                value + cell_size / 2.0
            } else {
                value
            }
        };
        let sw_corner_center = Coord {
            x: center(x, x_corner),
            y: center(y, y_corner),
        };
        Ok((cols, rows, cell_size, sw_corner_center, self.nodata))
    }
}

#[cfg(test)]
mod tests {
    use super::Raster;
    use crate::{FootprintError, TerrainSampler};
    use approx::assert_relative_eq;
    use geo::{coord, Line};

    /// `z = x + 2y` over a 4x3 grid with unit cells, corner at origin.
    const PLANE: &str = "\
ncols 4
nrows 3
xllcorner 0.0
yllcorner 0.0
cellsize 1.0
NODATA_value -9999
5.5 6.5 7.5 8.5
3.5 4.5 5.5 6.5
1.5 2.5 3.5 4.5
";

    fn plane() -> Raster {
        Raster::parse_ascii_grid(PLANE.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let raster = plane();
        assert_eq!(raster.dimensions(), (4, 3));
        assert_relative_eq!(raster.cell_size(), 1.0);
        // Southwest sample center sits half a cell in from the corner.
        assert_relative_eq!(raster.elevation(coord!(x: 0.5, y: 0.5)).unwrap(), 1.5);
        assert_relative_eq!(raster.elevation(coord!(x: 3.5, y: 2.5)).unwrap(), 8.5);
    }

    #[test]
    fn test_bilinear_on_plane() {
        let raster = plane();
        for (x, y) in [(1.2, 0.9), (2.75, 2.5), (3.5, 1.0), (0.5, 2.1)] {
            let z = raster.elevation(coord!(x: x, y: y)).unwrap();
            assert_relative_eq!(z, x + 2.0 * y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_outside_and_nodata() {
        let raster = plane();
        assert_eq!(raster.elevation(coord!(x: 0.4, y: 1.0)), None);
        assert_eq!(raster.elevation(coord!(x: 1.0, y: 2.6)), None);
        assert_eq!(raster.elevation(coord!(x: f64::NAN, y: 1.0)), None);

        let holey = PLANE.replace("4.5 5.5", "-9999 5.5");
        let raster = Raster::parse_ascii_grid(holey.as_bytes()).unwrap();
        assert_eq!(raster.elevation(coord!(x: 1.0, y: 1.0)), None);
        assert!(raster.elevation(coord!(x: 3.0, y: 1.0)).is_some());
    }

    #[test]
    fn test_center_registration() {
        let centered = PLANE
            .replace("xllcorner 0.0", "XLLCENTER 0.5")
            .replace("yllcorner 0.0", "YLLCENTER 0.5");
        let raster = Raster::parse_ascii_grid(centered.as_bytes()).unwrap();
        assert_relative_eq!(raster.elevation(coord!(x: 2.0, y: 1.5)).unwrap(), 5.0);
    }

    #[test]
    fn test_drape_raster() {
        let raster = plane();
        let line = Line::new(coord!(x: 0.5, y: 1.0), coord!(x: 3.5, y: 1.0));
        let profile = raster.drape(&line).unwrap();
        assert_eq!(profile.vertices.len(), 4);
        for vertex in &profile.vertices {
            assert_relative_eq!(vertex.z, vertex.x + 2.0, epsilon = 1e-12);
        }

        // Samples beyond the grid are dropped.
        let overhang = Line::new(coord!(x: -1.5, y: 1.0), coord!(x: 2.5, y: 1.0));
        assert_eq!(raster.drape(&overhang).unwrap().vertices.len(), 3);
    }

    #[test]
    fn test_malformed_grids() {
        let short = PLANE.replace("1.5 2.5 3.5 4.5\n", "");
        assert!(matches!(
            Raster::parse_ascii_grid(short.as_bytes()),
            Err(FootprintError::Raster(_))
        ));
        let headless = PLANE.replace("cellsize 1.0\n", "");
        assert!(matches!(
            Raster::parse_ascii_grid(headless.as_bytes()),
            Err(FootprintError::Raster(_))
        ));
        let garbled = PLANE.replace("6.5 7.5", "6.5 x");
        assert!(matches!(
            Raster::parse_ascii_grid(garbled.as_bytes()),
            Err(FootprintError::Raster(_))
        ));
        assert!(matches!(
            Raster::new(coord!(x: 0.0, y: 0.0), 0.0, (2, 2), vec![0.0; 4]),
            Err(FootprintError::InvalidParameter {
                name: "cell_size",
                ..
            })
        ));
    }
}
