//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::{SamplerError, SamplerResult};

/// Mean Earth radius used for all geodesic distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point from latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject points outside [-90, 90] x [-180, 180] (and NaN).
    ///
    /// Points are never wrapped or clamped; an out-of-range point is an error.
    pub fn validate(&self) -> SamplerResult<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(SamplerError::InvalidCoordinate {
                point: *self,
                message: "latitude must be within [-90, 90]".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(SamplerError::InvalidCoordinate {
                point: *self,
                message: "longitude must be within [-180, 180]".to_string(),
            });
        }
        Ok(())
    }

    /// Great-circle distance to another point in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Haversine distance between two lat/lon pairs, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}
