use crate::{
    io,
    options::Detect,
    store::{self, GeoJsonStore},
};
use anyhow::Result;
use footprint::{LayerNames, Survey};
use log::info;
use std::io::Write;

impl Detect {
    pub fn run(&self) -> Result<()> {
        let profiles = io::read_profiles(&self.profiles)?;
        let pipeline = self.toe.pipeline()?.build()?;
        let survey = pipeline.detect(&profiles);

        let names = store::timestamped_names();
        let mut store = GeoJsonStore::new(self.out_dir.clone())?;
        survey.persist(&mut store, &names)?;
        for path in store.flush()? {
            info!("wrote {path:?}");
        }

        report(&survey, &names, self.json)
    }
}

/// Prints `survey` to stdout, as JSON or as a short summary.
pub fn report(survey: &Survey, names: &LayerNames, json: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, survey)?;
        writeln!(stdout)?;
        return Ok(());
    }

    writeln!(
        stdout,
        "sections: {}, skipped: {}, toe points: {}",
        survey.sections.len(),
        survey.skipped,
        survey.toe_points().count()
    )?;
    writeln!(stdout, "{}", names.toe_points)?;
    match &survey.footprint {
        Some(footprint) => writeln!(
            stdout,
            "{}: {} sections, area {:.2}",
            names.footprint,
            footprint.sections(),
            footprint.area()
        )?,
        None => writeln!(
            stdout,
            "no footprint: no cross-section has toes on both sides"
        )?,
    }
    Ok(())
}
