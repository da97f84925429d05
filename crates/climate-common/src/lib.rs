//! Common types and utilities shared across the climate sampler crates.

pub mod error;
pub mod geo;
pub mod grid;
pub mod sample;

pub use error::{SamplerError, SamplerResult};
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use grid::{CellIndex, CellSize, GridOrigin, RasterGrid};
pub use sample::SampleResult;
