//! Wildlife management unit boundary features
//!
//! Geometry stays opaque JSON; the binding layer only needs each feature's unit
//! label and, for search hits, a bounding box to zoom to.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn default_feature_type() -> String {
    "Feature".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "default_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: default_collection_type(),
            features: Vec::new(),
        }
    }
}

impl FeatureCollection {
    /// Load a feature collection from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a feature collection.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self {
            kind: default_collection_type(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "default_feature_type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
}

impl Feature {
    /// Build a feature carrying only a label property (useful for tests)
    #[must_use]
    pub fn labelled(property: &str, label: &str, geometry: Value) -> Self {
        let mut properties = Map::new();
        properties.insert(property.to_string(), Value::String(label.to_string()));
        Self {
            kind: default_feature_type(),
            properties,
            geometry,
        }
    }

    /// Non-empty string value of `property`.
    #[must_use]
    pub fn label(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
    }

    /// Bounding box of every coordinate pair in the geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let coordinates = self.geometry.get("coordinates")?;
        let mut bounds: Option<Bounds> = None;
        visit_positions(coordinates, &mut |lon, lat| {
            bounds = Some(bounds.map_or_else(|| Bounds::point(lon, lat), |b| b.extend(lon, lat)));
        });
        bounds
    }
}

/// Longitude/latitude box, west-south to east-north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    #[must_use]
    pub const fn point(lon: f64, lat: f64) -> Self {
        Self {
            west: lon,
            south: lat,
            east: lon,
            north: lat,
        }
    }

    #[must_use]
    pub fn extend(self, lon: f64, lat: f64) -> Self {
        Self {
            west: self.west.min(lon),
            south: self.south.min(lat),
            east: self.east.max(lon),
            north: self.north.max(lat),
        }
    }
}

fn visit_positions(value: &Value, visit: &mut dyn FnMut(f64, f64)) {
    let Value::Array(items) = value else {
        return;
    };
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => visit(lon, lat),
        _ => {
            for item in items {
                visit_positions(item, visit);
            }
        }
    }
}
