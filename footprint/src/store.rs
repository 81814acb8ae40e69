//! Typed feature layers.

use crate::{math::Vertex, FootprintError, C};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Polyline,
    Polygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Polyline => "polyline",
            GeometryKind::Polygon => "polygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Vertex),
    Polyline(Vec<Vertex>),

    /// A single closed exterior ring.
    Polygon(Vec<Vertex>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polyline(_) => GeometryKind::Polyline,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Double,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
}

impl Field {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldType::Text,
        }
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldType::Double,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Double(C),
}

impl Value {
    pub fn kind(&self) -> FieldType {
        match self {
            Value::Text(_) => FieldType::Text,
            Value::Double(_) => FieldType::Double,
        }
    }
}

impl From<C> for Value {
    fn from(value: C) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

/// A geometry with named attribute values.
///
/// Attributes absent from a feature are null.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub attributes: Vec<(String, Value)>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A named, typed feature container.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub kind: GeometryKind,
    pub fields: Vec<Field>,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: GeometryKind, fields: &[Field]) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: fields.to_vec(),
            features: Vec::new(),
        }
    }

    /// Appends `feature` after checking it against the layer schema.
    pub fn push(&mut self, feature: Feature) -> Result<(), FootprintError> {
        if feature.geometry.kind() != self.kind {
            return Err(FootprintError::GeometryKind {
                layer: self.name.clone(),
                expected: self.kind.as_str(),
            });
        }
        for (name, value) in &feature.attributes {
            let field = self
                .fields
                .iter()
                .find(|field| &field.name == name)
                .ok_or_else(|| FootprintError::Store(format!("{}: no field '{name}'", self.name)))?;
            if field.kind != value.kind() {
                return Err(FootprintError::FieldType {
                    layer: self.name.clone(),
                    field: name.clone(),
                    expected: field.kind.as_str(),
                });
            }
        }
        self.features.push(feature);
        Ok(())
    }
}

/// Persistence for typed feature layers.
pub trait GeometryStore {
    /// Creates an empty layer; names are unique within a store.
    fn create_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
        fields: &[Field],
    ) -> Result<(), FootprintError>;

    /// Appends a feature, preserving insertion order.
    fn insert(&mut self, layer: &str, feature: Feature) -> Result<(), FootprintError>;

    /// Features of `layer` in insertion order.
    fn features(&self, layer: &str) -> Result<&[Feature], FootprintError>;
}

/// Keeps layers in memory, in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layers: Vec<Layer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    fn layer_mut(&mut self, name: &str) -> Result<&mut Layer, FootprintError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.name == name)
            .ok_or_else(|| FootprintError::UnknownLayer(name.to_owned()))
    }
}

impl GeometryStore for MemoryStore {
    fn create_layer(
        &mut self,
        name: &str,
        kind: GeometryKind,
        fields: &[Field],
    ) -> Result<(), FootprintError> {
        if self.layer(name).is_some() {
            return Err(FootprintError::DuplicateLayer(name.to_owned()));
        }
        self.layers.push(Layer::new(name, kind, fields));
        Ok(())
    }

    fn insert(&mut self, layer: &str, feature: Feature) -> Result<(), FootprintError> {
        self.layer_mut(layer)?.push(feature)
    }

    fn features(&self, layer: &str) -> Result<&[Feature], FootprintError> {
        self.layer(layer)
            .map(|layer| layer.features.as_slice())
            .ok_or_else(|| FootprintError::UnknownLayer(layer.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, Field, Geometry, GeometryKind, GeometryStore, MemoryStore, Value};
    use crate::{math::Vertex, FootprintError};

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .create_layer(
                "toes",
                GeometryKind::Point,
                &[Field::text("Side"), Field::double("ElevDrop")],
            )
            .unwrap();
        store
    }

    fn point() -> Geometry {
        Geometry::Point(Vertex::new(1.0, 2.0, 3.0))
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut store = store();
        store
            .insert("toes", Feature::new(point()).with("Side", "Left").with("ElevDrop", 4.5))
            .unwrap();
        store
            .insert("toes", Feature::new(point()).with("Side", "Right"))
            .unwrap();

        let features = store.features("toes").unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].get("ElevDrop"), Some(&Value::Double(4.5)));
        assert_eq!(features[1].get("Side"), Some(&Value::Text("Right".into())));
        assert_eq!(features[1].get("ElevDrop"), None);
    }

    #[test]
    fn test_schema_is_enforced() {
        let mut store = store();
        assert!(matches!(
            store.insert("toes", Feature::new(point()).with("Side", 1.0)),
            Err(FootprintError::FieldType { .. })
        ));
        assert!(matches!(
            store.insert("toes", Feature::new(point()).with("Colour", "red")),
            Err(FootprintError::Store(_))
        ));
        assert!(matches!(
            store.insert("toes", Feature::new(Geometry::Polyline(Vec::new()))),
            Err(FootprintError::GeometryKind { .. })
        ));
        assert!(store.features("toes").unwrap().is_empty());
    }

    #[test]
    fn test_layer_names() {
        let mut store = store();
        assert!(matches!(
            store.create_layer("toes", GeometryKind::Point, &[]),
            Err(FootprintError::DuplicateLayer(_))
        ));
        assert!(matches!(
            store.insert("nope", Feature::new(point())),
            Err(FootprintError::UnknownLayer(_))
        ));
        assert!(matches!(
            store.features("nope"),
            Err(FootprintError::UnknownLayer(_))
        ));
    }
}
