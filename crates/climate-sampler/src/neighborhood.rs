//! Enumeration of grid cells within a geodesic radius.
//!
//! Candidates are the centers of the grid's cells, so every returned point
//! resolves cleanly to one cell through [`crate::mapper::raw_index`]. The
//! search window is the exact lat/lon bounding box of the spherical cap around
//! the center: its longitude half-width grows as `1 / cos(lat)` toward the
//! poles and becomes the full circle once the cap reaches a pole. Within the
//! window every candidate is checked with the haversine distance, so the
//! result is exact for any latitude.

use climate_common::{CellSize, GeoPoint, GridOrigin, EARTH_RADIUS_KM};

use crate::mapper::{raw_cell_center, raw_index};

/// Slack, in cells, added to the window so boundary cells are not lost to rounding.
const WINDOW_EPSILON: f64 = 1e-9;

/// Lat/lon box guaranteed to contain every point within the radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    pub min_lat: f64,
    pub max_lat: f64,
    /// Longitude half-width in degrees; `None` when the window spans all longitudes.
    pub lon_half_extent: Option<f64>,
}

impl SearchWindow {
    /// Bounding box of the spherical cap of `radius_km` around `center`.
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let angular_deg = angular.to_degrees();
        let min_lat = (center.lat - angular_deg).max(-90.0);
        let max_lat = (center.lat + angular_deg).min(90.0);

        let lon_half_extent = if min_lat <= -90.0 || max_lat >= 90.0 {
            None
        } else {
            let ratio = angular.sin() / center.lat.to_radians().cos();
            if ratio >= 1.0 {
                None
            } else {
                Some(ratio.asin().to_degrees())
            }
        };

        Self {
            min_lat,
            max_lat,
            lon_half_extent,
        }
    }
}

/// Points of the grid whose cells lie within `radius_km` of `center`.
///
/// A radius of zero or less, or one that is not finite, yields exactly
/// `center`. Otherwise the result
/// holds the center of every cell whose center is within `radius_km`
/// (inclusive), and starts with `center` itself when its own cell's center is
/// farther away than the radius, so the cell under the query point is always
/// part of its neighborhood. Longitudes are wrapped into
/// `[origin.lon, origin.lon + 360)`.
pub fn points_within_distance(
    center: GeoPoint,
    radius_km: f64,
    origin: GridOrigin,
    cell_size: CellSize,
) -> Vec<GeoPoint> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return vec![center];
    }

    let window = SearchWindow::around(center, radius_km);

    // Rows whose center latitude lies in [min_lat, max_lat].
    let first_row =
        ((origin.lat - window.max_lat) / cell_size.lat_step - 0.5 - WINDOW_EPSILON).ceil() as i64;
    let last_row =
        ((origin.lat - window.min_lat) / cell_size.lat_step - 0.5 + WINDOW_EPSILON).floor() as i64;

    let cols_around = ((360.0 / cell_size.lon_step).round() as i64).max(1);
    let (first_col, last_col) = match window.lon_half_extent {
        Some(half) => {
            let west = center.lon - half - origin.lon;
            let east = center.lon + half - origin.lon;
            let first = (west / cell_size.lon_step - 0.5 - WINDOW_EPSILON).ceil() as i64;
            let last = (east / cell_size.lon_step - 0.5 + WINDOW_EPSILON).floor() as i64;
            if last - first + 1 >= cols_around {
                (0, cols_around - 1)
            } else {
                (first, last)
            }
        }
        None => (0, cols_around - 1),
    };

    let mut points = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let mut candidate = raw_cell_center(row, col, origin, cell_size);
            if !(-90.0..=90.0).contains(&candidate.lat) {
                continue;
            }
            candidate.lon = wrap_longitude(candidate.lon, origin.lon);
            if center.distance_km(&candidate) <= radius_km {
                points.push(candidate);
            }
        }
    }

    let (own_row, own_col) = raw_index(center, origin, cell_size);
    let own_center = raw_cell_center(own_row, own_col, origin, cell_size);
    if center.distance_km(&own_center) > radius_km {
        points.insert(0, center);
    }

    points
}

fn wrap_longitude(lon: f64, west: f64) -> f64 {
    if lon >= west + 360.0 {
        lon - 360.0
    } else if lon < west {
        lon + 360.0
    } else {
        lon
    }
}
