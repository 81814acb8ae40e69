use crate::{io, options::Plot};
use anyhow::{anyhow, Result};
use footprint::{Measurements, ToePoint};
use std::io::Write;
use textplots::{Chart, Plot as _, Shape};

impl Plot {
    pub fn run(&self) -> Result<()> {
        let profiles = io::read_profiles(&self.profiles)?;
        let stationed = profiles.get(self.index).ok_or_else(|| {
            anyhow!(
                "no cross-section {}, {} has {}",
                self.index,
                self.profiles.display(),
                profiles.len()
            )
        })?;
        let pipeline = self.toe.pipeline()?.build()?;
        let analyzer = pipeline.analyzer();
        let measurements = analyzer
            .measure(&stationed.profile)
            .ok_or_else(|| anyhow!("cross-section {} is degenerate", self.index))?;
        let toes = analyzer.classify(&measurements);

        let elevation = series(&measurements, |i| measurements.vertices.get(i).map(|v| v.z));
        let slope = series(&measurements, |i| measurements.slope_at(i));

        println!("elevation");
        chart(&elevation);
        println!("slope (degrees)");
        chart(&slope);

        let mut stdout = std::io::stdout().lock();
        if let Some(station) = stationed.station {
            writeln!(stdout, "station: {station}")?;
        }
        let crest = measurements.crest_vertex();
        writeln!(stdout, "crest: ({}, {}, {})", crest.x, crest.y, crest.z)?;
        for toe in [toes.left, toes.right] {
            match toe {
                Some(toe) => print_toe(&mut stdout, &toe)?,
                None => writeln!(stdout, "toe: none")?,
            }
        }
        Ok(())
    }
}

/// `(signed distance from crest, value)` for every vertex with a value.
#[allow(clippy::cast_possible_truncation)]
fn series<F>(m: &Measurements, value: F) -> Vec<(f32, f32)>
where
    F: Fn(usize) -> Option<f64>,
{
    let crest = m.crest_vertex();
    m.vertices
        .iter()
        .enumerate()
        .filter_map(|(i, vertex)| {
            let distance = crest.planar_distance(vertex);
            let offset = if i < m.crest { -distance } else { distance };
            value(i).map(|v| (offset as f32, v as f32))
        })
        .collect()
}

fn chart(data: &[(f32, f32)]) {
    let (Some(first), Some(last)) = (data.first(), data.last()) else {
        return;
    };
    Chart::new(300, 100, first.0, last.0)
        .lineplot(&Shape::Lines(data))
        .display();
}

fn print_toe(mut out: impl Write, toe: &ToePoint) -> Result<()> {
    writeln!(
        out,
        "toe {}: ({}, {}, {}), slope {:.2}°, curvature {:.2}, {:.2} from crest, drop {:.2}",
        toe.side,
        toe.position.x,
        toe.position.y,
        toe.position.z,
        toe.slope_deg,
        toe.curvature,
        toe.distance_from_crest,
        toe.elevation_drop
    )?;
    Ok(())
}
