//! Point and neighborhood sampling of gridded climate rasters.
//!
//! Given a named layer (e.g. a WorldClim `bio1` annual mean temperature grid)
//! and a list of (latitude, longitude) points, the engine returns per point:
//!
//! - **value**: the raw value of the cell containing the point
//! - **average**: the mean of valid cells within a geodesic radius
//! - **variance**: the population variance of those cells (missing above 60°)
//!
//! No-data cells are excluded and reported as [`SampleResult::Missing`],
//! never as zero.
//!
//! # Architecture
//!
//! ```text
//! SamplingEngine::sample_average(name, points, radius_km)
//!      │
//!      ├─► LayerCache::get_or_load(name)      (once per name)
//!      │         │
//!      │         └─► LayerLoader: resolve path → .hdr metadata → .bil cells
//!      │
//!      └─► for each point
//!               │
//!               ├─► points_within_distance()  (grid-aligned cell centers)
//!               ├─► CoordinateMapper          (point → CellIndex)
//!               └─► mean / population variance of valid cells
//! ```
//!
//! # Example
//!
//! ```ignore
//! use climate_sampler::{GeoPoint, SamplerConfig, SamplingEngine};
//!
//! let engine = SamplingEngine::from_config(SamplerConfig::from_env())?;
//! let points = [GeoPoint::new(10.0, 10.0), GeoPoint::new(0.0, 0.0)];
//!
//! let values = engine.sample_value("bio1", &points)?;
//! let averages = engine.sample_average("bio1", &points, 40.0)?;
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod layer;
pub mod loader;
pub mod mapper;
pub mod neighborhood;
pub mod stats;

// Re-export commonly used types at crate root
pub use cache::{LayerCache, LayerCacheStats};
pub use climate_common::{
    CellIndex, CellSize, GeoPoint, GridOrigin, RasterGrid, SampleResult, SamplerError,
    SamplerResult,
};
pub use config::SamplerConfig;
pub use engine::SamplingEngine;
pub use layer::{Layer, LayerMetadata, DEFAULT_NODATA};
pub use loader::{
    metadata_from_header, BilRasterSource, DataPaths, FileLayerLoader, LayerLoader,
    MemoryLayerLoader, PathResolver, RasterSource,
};
pub use mapper::CoordinateMapper;
pub use neighborhood::{points_within_distance, SearchWindow};
