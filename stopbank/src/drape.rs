use crate::{
    detect, io,
    options::Drape,
    store::{self, GeoJsonStore},
};
use anyhow::{Context, Result};
use footprint::{persist_profiles, GeometryStore, Raster};
use log::info;

impl Drape {
    pub fn run(&self) -> Result<()> {
        let centerline = io::read_centerline(&self.centerline)?;
        let dem = Raster::load(&self.dem)
            .with_context(|| format!("loading DEM {}", self.dem.display()))?
            .interval(self.interval)?;
        let pipeline = self
            .toe
            .pipeline()?
            .spacing(self.section.spacing)
            .half_length(self.section.half_length)
            .build()?;
        let profiles = pipeline.drape(&centerline, &dem)?;

        let names = store::timestamped_names();
        let mut store = GeoJsonStore::new(self.out_dir.clone())?;
        persist_profiles(&profiles, &mut store, &names.profiles)?;
        let survey = self.detect.then(|| pipeline.detect(&profiles));
        if let Some(survey) = &survey {
            survey.persist(&mut store, &names)?;
        }
        for path in store.flush()? {
            info!("wrote {path:?}");
        }

        if !self.json {
            println!(
                "{}: {} of {} cross-sections draped",
                names.profiles,
                store.features(&names.profiles)?.len(),
                profiles.len()
            );
        }
        match survey {
            Some(survey) => detect::report(&survey, &names, self.json),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{options::Cli, store::read_layer};
    use approx::assert_relative_eq;
    use clap::Parser;
    use geojson::Value as GeoValue;
    use std::{fmt::Write, fs, path::Path};

    /// A straight levee along `y = 0`, crest 5 high, toes 8 out, on a
    /// unit grid covering `x` in `-5..=55`, `y` in `-25..=25`.
    fn write_dem(path: &Path) {
        let mut text = String::from(
            "ncols 61\nnrows 51\nxllcenter -5\nyllcenter -25\ncellsize 1\nnodata_value -9999\n",
        );
        for row in 0..51 {
            let y = 25.0 - f64::from(row);
            let z = (5.0 - 5.0 * y.abs() / 8.0).max(0.0);
            let line = vec![z.to_string(); 61].join(" ");
            writeln!(text, "{line}").unwrap();
        }
        fs::write(path, text).unwrap();
    }

    fn drape(dir: &Path, extra: &[&str]) -> std::path::PathBuf {
        let centerline = dir.join("centerline.geojson");
        fs::write(
            &centerline,
            r#"{"type": "LineString", "coordinates": [[0, 0], [50, 0]]}"#,
        )
        .unwrap();
        let dem = dir.join("dem.asc");
        write_dem(&dem);
        let out = dir.join("out");

        let mut args = vec![
            "stopbank",
            "drape",
            "-c",
            centerline.to_str().unwrap(),
            "-d",
            dem.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        let Cli::Drape(drape) = Cli::try_parse_from(args).unwrap() else {
            panic!("expected drape");
        };
        drape.run().unwrap();
        out
    }

    #[test]
    fn test_drape_writes_3d_lines() {
        let dir = tempfile::tempdir().unwrap();
        let out = drape(dir.path(), &[]);

        let lines = read_layer(&out, "stopbank3DLines_").unwrap();
        assert_eq!(lines.features.len(), 6);
        for (feature, station) in lines.features.iter().zip([0.0, 10.0, 20.0, 30.0, 40.0, 50.0]) {
            assert_eq!(
                feature.property("Station").and_then(|v| v.as_f64()),
                Some(station)
            );
            let Some(GeoValue::LineString(positions)) = feature.geometry.as_ref().map(|g| &g.value)
            else {
                panic!("expected a line");
            };
            assert_eq!(positions.len(), 41);
            assert_relative_eq!(positions[0][2], 0.0, epsilon = 1e-9);
            assert_relative_eq!(positions[20][2], 5.0, epsilon = 1e-9);
        }
        assert!(read_layer(&out, "toePoints_").is_none());
    }

    #[test]
    fn test_drape_and_detect() {
        let dir = tempfile::tempdir().unwrap();
        let out = drape(dir.path(), &["--detect", "--spacing", "25"]);

        assert_eq!(
            read_layer(&out, "stopbank3DLines_").unwrap().features.len(),
            3
        );
        assert_eq!(read_layer(&out, "toePoints_").unwrap().features.len(), 6);
        let footprint = read_layer(&out, "stopbankFootprint_").unwrap();
        let area = footprint.features[0]
            .property("Area")
            .and_then(|v| v.as_f64())
            .unwrap();
        assert_relative_eq!(area, 50.0 * 17.0, epsilon = 1e-6);
    }
}
