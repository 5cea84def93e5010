//! Derived views over a history store.
//!
//! Renderers only read the store; they never mutate it. Output order follows
//! the store's bucket order, so two renders of the same history are
//! byte-identical.

use serde::Serialize;
use serde_json::{Map, Value};

use locbook_store::HistoryStore;
use locbook_types::{Bucket, LocalStamp};

use crate::error::RenderError;
use crate::geojson::{Feature, FeatureCollection};

/// Approximate length of one degree of latitude/longitude at the equator, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Property key the live map reads its popup text from.
pub const POPUP_PROPERTY: &str = "popupContent";

/// Display settings handed to the heatmap layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapConfig {
    /// Point radius in meters, matching the bucket size.
    pub radius: f64,
    /// Blur amount.
    pub blur: u32,
}

impl HeatmapConfig {
    pub fn new(precision: u32, blur: u32) -> Self {
        Self {
            radius: radius_meters(precision),
            blur,
        }
    }
}

/// Width of one bucket in meters at the equator.
///
/// ```
/// use locbook_core::render::radius_meters;
///
/// assert_eq!(radius_meters(4), 11.132);
/// ```
pub fn radius_meters(precision: u32) -> f64 {
    METERS_PER_DEGREE / 10f64.powi(precision as i32)
}

/// One heatmap point: `(latitude, longitude, weight)`.
///
/// Latitude comes first, which is what Leaflet.heat expects.
pub type HeatPoint = (f64, f64, usize);

/// Heatmap points for every bucket, weighted by its total observation count.
pub fn heatmap_points(store: &HistoryStore) -> Vec<HeatPoint> {
    store
        .iter()
        .map(|(bucket, _)| (bucket.latitude(), bucket.longitude(), store.weight(bucket)))
        .collect()
}

/// Render the heatmap data file.
///
/// The result is a script defining two globals, `points` and `config`:
///
/// ```text
/// var points = [[52.52,13.405,3]];
/// var config = {"radius":11.132,"blur":5};
/// ```
pub fn render_heatmap(
    store: &HistoryStore,
    precision: u32,
    blur: u32,
) -> Result<String, RenderError> {
    let points = serde_json::to_string(&heatmap_points(store))?;
    let config = serde_json::to_string(&HeatmapConfig::new(precision, blur))?;
    Ok(format!("var points = {};\nvar config = {};\n", points, config))
}

/// What a GeoJSON render covers.
#[derive(Debug, Clone, Copy)]
pub enum GeoJsonSource<'a> {
    /// Every bucket, with each date's times as a property.
    History(&'a HistoryStore),
    /// A single observation with a popup label.
    Live { bucket: Bucket, label: &'a str },
}

impl GeoJsonSource<'_> {
    /// Build the feature collection for this source.
    pub fn collection(&self) -> FeatureCollection {
        match self {
            GeoJsonSource::History(store) => history_collection(store),
            GeoJsonSource::Live { bucket, label } => live_collection(bucket, label),
        }
    }
}

/// Render a GeoJSON `FeatureCollection` document.
pub fn render_geojson(source: GeoJsonSource<'_>) -> Result<String, RenderError> {
    Ok(serde_json::to_string(&source.collection())?)
}

/// One Point feature per bucket; property keys are dates, values the time lists.
pub fn history_collection(store: &HistoryStore) -> FeatureCollection {
    let features = store
        .iter()
        .map(|(bucket, dates)| {
            let properties: Map<String, Value> = dates
                .iter()
                .map(|(date, times)| (date.clone(), Value::from(times.clone())))
                .collect();
            Feature::point(bucket, properties)
        })
        .collect();

    FeatureCollection { features }
}

/// A collection holding just one labelled point.
pub fn live_collection(bucket: &Bucket, label: &str) -> FeatureCollection {
    let mut properties = Map::new();
    properties.insert(POPUP_PROPERTY.to_string(), Value::from(label));
    FeatureCollection {
        features: vec![Feature::point(bucket, properties)],
    }
}

/// Popup text for a live point: device, date and time on separate lines.
///
/// The device id comes from the client and is HTML-escaped; the line breaks
/// are markup.
pub fn popup_label(device: &str, stamp: &LocalStamp) -> String {
    format!(
        "Device: {}<br>Date: {}<br>Time: {}",
        escape_html(device),
        stamp.date,
        stamp.time
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn berlin() -> Bucket {
        Bucket::new(13.40495, 52.52003, 4)
    }

    fn sample_store() -> HistoryStore {
        let mut store = HistoryStore::new();
        store.add(berlin(), "2024-01-01", "10-00-00");
        store.add(berlin(), "2024-01-01", "10-05-00");
        store.add(berlin(), "2024-01-02", "09-00-00");
        store.add(Bucket::new(-0.1276, 51.5072, 4), "2024-01-02", "18-30-00");
        store
    }

    fn stamp() -> LocalStamp {
        LocalStamp {
            date: "2023-11-14".to_string(),
            time: "22-13-20".to_string(),
        }
    }

    #[test]
    fn test_radius_meters() {
        assert_eq!(radius_meters(0), 111_320.0);
        assert_eq!(radius_meters(4), 11.132);
        assert_eq!(radius_meters(5), 1.1132);
    }

    #[test]
    fn test_heatmap_weight_counts_all_dates() {
        let points = heatmap_points(&sample_store());
        let set: HashSet<_> = points
            .iter()
            .map(|(lat, lon, w)| (lat.to_bits(), lon.to_bits(), *w))
            .collect();

        assert_eq!(points.len(), 2);
        assert!(set.contains(&(52.52f64.to_bits(), 13.405f64.to_bits(), 3)));
        assert!(set.contains(&(51.5072f64.to_bits(), (-0.1276f64).to_bits(), 1)));
    }

    #[test]
    fn test_render_heatmap_text() {
        let mut store = HistoryStore::new();
        store.add(berlin(), "2023-11-14", "22-13-20");

        let js = render_heatmap(&store, 4, 5).unwrap();
        assert_eq!(
            js,
            "var points = [[52.52,13.405,1]];\nvar config = {\"radius\":11.132,\"blur\":5};\n"
        );
    }

    #[test]
    fn test_render_heatmap_empty() {
        let js = render_heatmap(&HistoryStore::new(), 5, 3).unwrap();
        assert!(js.starts_with("var points = [];"));
        assert!(js.contains("\"radius\":1.1132"));
        assert!(js.contains("\"blur\":3"));
    }

    #[test]
    fn test_render_heatmap_is_deterministic() {
        let store = sample_store();
        assert_eq!(
            render_heatmap(&store, 4, 5).unwrap(),
            render_heatmap(&store.clone(), 4, 5).unwrap()
        );
    }

    #[test]
    fn test_history_geojson() {
        let json = render_geojson(GeoJsonSource::History(&sample_store())).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let berlin_feature = features
            .iter()
            .find(|f| f["geometry"]["coordinates"] == json!([13.405, 52.52]))
            .unwrap();
        assert_eq!(
            berlin_feature["properties"],
            json!({
                "2024-01-01": ["10-00-00", "10-05-00"],
                "2024-01-02": ["09-00-00"]
            })
        );
    }

    #[test]
    fn test_history_geojson_empty() {
        let json = render_geojson(GeoJsonSource::History(&HistoryStore::new())).unwrap();
        assert_eq!(json, r#"{"type":"FeatureCollection","features":[]}"#);
    }

    #[test]
    fn test_live_geojson() {
        let label = popup_label("phone1", &stamp());
        let json = render_geojson(GeoJsonSource::Live {
            bucket: berlin(),
            label: &label,
        })
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["geometry"]["type"], "Point");
        assert_eq!(features[0]["geometry"]["coordinates"], json!([13.405, 52.52]));
        assert_eq!(
            features[0]["properties"][POPUP_PROPERTY],
            "Device: phone1<br>Date: 2023-11-14<br>Time: 22-13-20"
        );
    }

    #[test]
    fn test_popup_label_escapes_device() {
        let label = popup_label("<b>me</b> & \"you\"", &stamp());
        assert!(label.starts_with("Device: &lt;b&gt;me&lt;/b&gt; &amp; &quot;you&quot;<br>"));
    }
}
