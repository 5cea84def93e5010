//! Minimal GeoJSON model (RFC 7946), limited to Point features.

use serde::Serialize;
use serde_json::{Map, Value};

use locbook_types::Bucket;

/// A GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// A GeoJSON `Feature` with free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

/// A GeoJSON geometry. Positions are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
}

impl Geometry {
    /// Point geometry at a bucket.
    pub fn point(bucket: &Bucket) -> Self {
        Geometry::Point([bucket.longitude(), bucket.latitude()])
    }
}

impl Feature {
    /// Point feature at `bucket`.
    pub fn point(bucket: &Bucket, properties: Map<String, Value>) -> Self {
        Self {
            geometry: Geometry::point(bucket),
            properties,
        }
    }
}
