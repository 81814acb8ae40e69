use crate::io;
use anyhow::Result;
use chrono::Local;
use footprint::{
    Feature, Field, FootprintError, Geometry, GeometryKind, GeometryStore, Layer, LayerNames,
    MemoryStore, Value, Vertex,
};
use geojson::{JsonObject, Value as GeoValue};
use log::debug;
use serde_json::Value as JsonValue;
use std::{fs, path::PathBuf};

/// Writes each layer to `<dir>/<layer>.geojson` on [`flush`].
///
/// [`flush`]: GeoJsonStore::flush
pub struct GeoJsonStore {
    dir: PathBuf,
    layers: MemoryStore,
}

impl GeoJsonStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            layers: MemoryStore::new(),
        })
    }

    /// Writes every layer, returning the paths written.
    pub fn flush(&self) -> Result<Vec<PathBuf>> {
        self.layers
            .layers()
            .iter()
            .map(|layer| self.write_layer(layer))
            .collect()
    }

    fn write_layer(&self, layer: &Layer) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.geojson", layer.name));
        let tmp_path = {
            let mut p = path.clone();
            p.set_extension("tmp");
            p
        };
        let features = layer
            .features
            .iter()
            .map(|feature| to_geojson(layer, feature))
            .collect();
        io::write(Some(&tmp_path), &io::collection(features))?;
        fs::rename(&tmp_path, &path)?;
        debug!("wrote {} features to {path:?}", layer.features.len());
        Ok(path)
    }

}

/// Layer names suffixed with the local time, `%Y%m%d_%H%M%S`.
pub fn timestamped_names() -> LayerNames {
    LayerNames::with_suffix(&Local::now().format("%Y%m%d_%H%M%S").to_string())
}

/// The collection in `dir` whose file name starts with `prefix`.
#[cfg(test)]
pub fn read_layer(dir: &std::path::Path, prefix: &str) -> Option<geojson::FeatureCollection> {
    let path = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with(prefix))
        })?;
    match io::open(&path).unwrap() {
        geojson::GeoJson::FeatureCollection(collection) => Some(collection),
        other => panic!("expected a feature collection, got {other:?}"),
    }
}

impl GeometryStore for GeoJsonStore {
    fn create_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
        fields: &[Field],
    ) -> Result<(), FootprintError> {
        self.layers.create_layer(name, kind, fields)
    }

    fn insert(&mut self, layer: &str, feature: Feature) -> Result<(), FootprintError> {
        self.layers.insert(layer, feature)
    }

    fn features(&self, layer: &str) -> Result<&[Feature], FootprintError> {
        self.layers.features(layer)
    }
}

/// Every field of the layer is written; missing attributes are `null`.
fn to_geojson(layer: &Layer, feature: &Feature) -> geojson::Feature {
    let position = |v: &Vertex| vec![v.x, v.y, v.z];
    let value = match &feature.geometry {
        Geometry::Point(vertex) => GeoValue::Point(position(vertex)),
        Geometry::Polyline(vertices) => GeoValue::LineString(vertices.iter().map(position).collect()),
        Geometry::Polygon(ring) => GeoValue::Polygon(vec![ring.iter().map(position).collect()]),
    };
    let mut properties = JsonObject::new();
    for field in &layer.fields {
        let json = match feature.get(&field.name) {
            Some(Value::Text(text)) => JsonValue::String(text.clone()),
            Some(Value::Double(number)) => io::number(*number),
            None => JsonValue::Null,
        };
        properties.insert(field.name.clone(), json);
    }
    io::feature(value, properties)
}
