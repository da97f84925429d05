//! JSON rendering of sampling results.

use std::path::PathBuf;

use climate_common::{GeoPoint, SampleResult};
use climate_sampler::{Layer, LayerMetadata};
use serde::Serialize;

/// One row of output: the query point and its result (`null` when missing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointSample {
    pub lat: f64,
    pub lon: f64,
    pub value: SampleResult,
}

/// Pair points with their results, keeping input order.
pub fn pair_results(points: &[GeoPoint], results: &[SampleResult]) -> Vec<PointSample> {
    points
        .iter()
        .zip(results)
        .map(|(point, value)| PointSample {
            lat: point.lat,
            lon: point.lon,
            value: *value,
        })
        .collect()
}

/// Description of a loaded layer for the `info` command.
#[derive(Debug, Clone, Serialize)]
pub struct LayerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: LayerMetadata,
    /// Sentinel in effect after defaulting.
    pub effective_nodata: f64,
    pub global: bool,
}

impl From<&Layer> for LayerInfo {
    fn from(layer: &Layer) -> Self {
        Self {
            name: layer.name().to_string(),
            source: layer.source().map(PathBuf::from),
            metadata: layer.metadata(),
            effective_nodata: layer.nodata(),
            global: layer.mapper().is_global(),
        }
    }
}

/// Render `value` as JSON, pretty-printed when asked.
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_renders_as_null() {
        let points = [GeoPoint::new(10.0, 10.0), GeoPoint::new(0.0, 0.0)];
        let results = [SampleResult::Value(257.0), SampleResult::Missing];

        let json = to_json(&pair_results(&points, &results), false).unwrap();

        assert_eq!(
            json,
            r#"[{"lat":10.0,"lon":10.0,"value":257.0},{"lat":0.0,"lon":0.0,"value":null}]"#
        );
    }

    #[test]
    fn test_pairs_keep_order() {
        let points = [GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)];
        let results = [SampleResult::Missing, SampleResult::Value(1.5)];
        let rows = pair_results(&points, &results);
        assert_eq!(rows[0].lat, 1.0);
        assert!(rows[0].value.is_missing());
        assert_eq!(rows[1].value.value(), Some(1.5));
    }
}
