//! GeoJSON input and output.

use anyhow::{anyhow, bail, Context, Result};
use footprint::{
    geo::{Coord, LineString},
    Centerline, CrossSection, SampledProfile, StationedProfile, Vertex,
};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value as GeoValue};
use serde_json::Value as JsonValue;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

pub fn open(path: &Path) -> Result<GeoJson> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse(rdr: impl Read) -> Result<GeoJson> {
    Ok(GeoJson::from_reader(rdr)?)
}

pub fn read_centerline(path: &Path) -> Result<Centerline> {
    centerline(open(path)?).with_context(|| format!("reading centerline {}", path.display()))
}

pub fn read_profiles(path: &Path) -> Result<Vec<StationedProfile>> {
    profiles(open(path)?).with_context(|| format!("reading profiles {}", path.display()))
}

/// The first LineString in `geojson`.
pub fn centerline(geojson: GeoJson) -> Result<Centerline> {
    let positions = features(geojson)
        .into_iter()
        .find_map(|feature| match feature.geometry.map(|g| g.value) {
            Some(GeoValue::LineString(positions)) => Some(positions),
            _ => None,
        })
        .ok_or_else(|| anyhow!("no LineString found"))?;
    let coords = positions
        .iter()
        .map(|position| coord(position))
        .collect::<Result<Vec<Coord<f64>>>>()?;
    Ok(Centerline::new(LineString::new(coords))?)
}

/// One profile per feature, in file order.
///
/// Features without geometry yield empty profiles, which are skipped
/// downstream. Any other non-LineString geometry is an error.
pub fn profiles(geojson: GeoJson) -> Result<Vec<StationedProfile>> {
    features(geojson)
        .into_iter()
        .enumerate()
        .map(|(i, feature)| {
            let station = feature.property("Station").and_then(JsonValue::as_f64);
            let positions = match feature.geometry.map(|g| g.value) {
                Some(GeoValue::LineString(positions)) => positions,
                Some(_) => bail!("feature {i}: expected a LineString"),
                None => Vec::new(),
            };
            let vertices = positions
                .iter()
                .map(|position| vertex(position))
                .collect::<Result<Vec<Vertex>>>()
                .with_context(|| format!("feature {i}"))?;
            Ok(StationedProfile {
                station,
                profile: SampledProfile::new(vertices),
            })
        })
        .collect()
}

pub fn sections_collection(sections: &[CrossSection]) -> FeatureCollection {
    let features = sections
        .iter()
        .map(|section| {
            let mut properties = JsonObject::new();
            properties.insert("Station".into(), number(section.station));
            let line = GeoValue::LineString(vec![
                vec![section.line.start.x, section.line.start.y],
                vec![section.line.end.x, section.line.end.y],
            ]);
            feature(line, properties)
        })
        .collect();
    collection(features)
}

/// Writes `collection` to `path`, or stdout when `path` is `None`.
pub fn write(path: Option<&Path>, collection: &FeatureCollection) -> Result<()> {
    match path {
        Some(path) => {
            let mut wtr = BufWriter::new(File::create(path)?);
            serde_json::to_writer(&mut wtr, collection)?;
            wtr.flush()?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer(&mut stdout, collection)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

pub fn feature(value: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Non-finite values have no JSON representation and become `null`.
pub fn number(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

fn features(geojson: GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    }
}

fn coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => bail!("position {position:?} has fewer than two ordinates"),
    }
}

fn vertex(position: &[f64]) -> Result<Vertex> {
    match position {
        [x, y, z, ..] => Ok(Vertex::new(*x, *y, *z)),
        _ => bail!("position {position:?} has no elevation"),
    }
}
