//! Canonical earthquake record and the plausibility bands used to validate it.

use serde::{Deserialize, Serialize};

/// Place used when a source row carries no location text.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// One earthquake event as served to map/list consumers.
///
/// Field order matches the wire contract:
/// `id, magnitude, place, time, longitude, latitude, depth, url, detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    /// Unique within one extraction run; not stable across runs.
    pub id: String,
    pub magnitude: f64,
    pub place: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometres. `0.0` when the source did not report a depth.
    pub depth: f64,
    /// Passthrough for richer sources; always `""` for the bulletin page.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub detail: String,
}

/// Latitude and longitude plausibility bands (inclusive).
///
/// The defaults cover the Philippine area of responsibility. A coordinate
/// outside its band is treated as a mis-extracted cell, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            lat_min: 3.0,
            lat_max: 22.0,
            lon_min: 115.0,
            lon_max: 128.0,
        }
    }
}

impl GeoBounds {
    #[must_use]
    pub fn contains_latitude(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lat_min && value <= self.lat_max
    }

    #[must_use]
    pub fn contains_longitude(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lon_min && value <= self.lon_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EarthquakeRecord {
        EarthquakeRecord {
            id: "table-0-1-1731738900000-00ff00".to_string(),
            magnitude: 4.5,
            place: "015 km N 45° E of Hinatuan (Surigao Del Sur)".to_string(),
            time: 1_763_274_900_000,
            longitude: 126.5,
            latitude: 8.45,
            depth: 12.0,
            url: String::new(),
            detail: String::new(),
        }
    }

    #[test]
    fn record_serializes_with_wire_field_set() {
        let json = serde_json::to_value(sample()).expect("serialize");
        let obj = json.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "depth",
                "detail",
                "id",
                "latitude",
                "longitude",
                "magnitude",
                "place",
                "time",
                "url"
            ]
        );
        assert_eq!(obj["url"], "");
        assert_eq!(obj["time"], 1_763_274_900_000_i64);
    }

    #[test]
    fn record_deserializes_without_passthrough_fields() {
        let json = r#"{"id":"a","magnitude":3.1,"place":"x","time":1,"longitude":120.0,"latitude":10.0,"depth":0.0}"#;
        let record: EarthquakeRecord = serde_json::from_str(json).expect("deserialize");
        assert!(record.url.is_empty());
        assert!(record.detail.is_empty());
    }

    #[test]
    fn default_bounds_are_inclusive() {
        let bounds = GeoBounds::default();
        assert!(bounds.contains_latitude(3.0));
        assert!(bounds.contains_latitude(22.0));
        assert!(!bounds.contains_latitude(2.9));
        assert!(bounds.contains_longitude(128.0));
        assert!(!bounds.contains_longitude(128.1));
        assert!(!bounds.contains_longitude(f64::NAN));
    }
}
