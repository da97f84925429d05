//! The sampling engine: point values, neighborhood averages and variances.

use std::sync::Arc;

use climate_common::{GeoPoint, SampleResult, SamplerError, SamplerResult};
use rayon::prelude::*;
use tracing::debug;

use crate::cache::{LayerCache, LayerCacheStats};
use crate::config::SamplerConfig;
use crate::layer::Layer;
use crate::loader::{FileLayerLoader, LayerLoader};
use crate::stats::{mean, population_variance};

/// Samples named layers at geographic points.
///
/// Every operation takes a layer name and an ordered slice of points and
/// returns one [`SampleResult`] per point, in the same order. The layer is
/// loaded on first use and kept for the lifetime of the engine.
pub struct SamplingEngine<L = FileLayerLoader> {
    config: SamplerConfig,
    cache: LayerCache<L>,
}

impl SamplingEngine<FileLayerLoader> {
    /// Engine reading `.bil` layers from the locations named in `config`.
    pub fn from_config(config: SamplerConfig) -> SamplerResult<Self> {
        config.validate()?;
        let loader = FileLayerLoader::from_config(&config);
        Ok(Self::with_loader(config, loader))
    }
}

impl<L: LayerLoader> SamplingEngine<L> {
    /// Engine over an arbitrary loader. The configuration is not validated.
    pub fn with_loader(config: SamplerConfig, loader: L) -> Self {
        Self {
            config,
            cache: LayerCache::new(loader),
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> LayerCacheStats {
        self.cache.stats()
    }

    /// The loaded layer for `name`, loading it if needed.
    pub fn layer(&self, name: &str) -> SamplerResult<Arc<Layer>> {
        self.cache.get_or_load(name)
    }

    /// Raw cell value under each point; missing for no-data cells.
    pub fn sample_value(&self, name: &str, points: &[GeoPoint]) -> SamplerResult<Vec<SampleResult>> {
        let layer = self.layer(name)?;
        self.map_points(points, |point| layer.sample(*point))
    }

    /// Mean of the valid cells within `radius_km` of each point.
    ///
    /// Missing when the neighborhood holds no valid cell.
    pub fn sample_average(
        &self,
        name: &str,
        points: &[GeoPoint],
        radius_km: f64,
    ) -> SamplerResult<Vec<SampleResult>> {
        check_radius(radius_km)?;
        let layer = self.layer(name)?;
        debug!(layer = name, points = points.len(), radius_km, "Sampling average");

        self.map_points(points, |point| {
            let values = layer.neighborhood_values(*point, radius_km)?;
            Ok(mean(&values).into())
        })
    }

    /// Population variance of the valid cells within `radius_km` of each point.
    ///
    /// Points poleward of the configured cutoff (60 degrees by default) are
    /// always missing: longitude cells shrink toward the poles and the
    /// neighborhood stops being comparable. Also missing when the neighborhood
    /// holds no valid cell.
    pub fn sample_variance(
        &self,
        name: &str,
        points: &[GeoPoint],
        radius_km: f64,
    ) -> SamplerResult<Vec<SampleResult>> {
        check_radius(radius_km)?;
        let layer = self.layer(name)?;
        let cutoff = self.config.polar_variance_cutoff_deg;
        debug!(layer = name, points = points.len(), radius_km, "Sampling variance");

        self.map_points(points, |point| {
            point.validate()?;
            if point.lat.abs() > cutoff {
                return Ok(SampleResult::Missing);
            }
            let values = layer.neighborhood_values(*point, radius_km)?;
            Ok(population_variance(&values).into())
        })
    }

    /// [`Self::sample_average`] with the configured default radius.
    pub fn sample_average_default(
        &self,
        name: &str,
        points: &[GeoPoint],
    ) -> SamplerResult<Vec<SampleResult>> {
        self.sample_average(name, points, self.config.default_radius_km)
    }

    /// [`Self::sample_variance`] with the configured default radius.
    pub fn sample_variance_default(
        &self,
        name: &str,
        points: &[GeoPoint],
    ) -> SamplerResult<Vec<SampleResult>> {
        self.sample_variance(name, points, self.config.default_radius_km)
    }

    /// Apply `f` to every point, in parallel for large batches. Order is kept.
    fn map_points<F>(&self, points: &[GeoPoint], f: F) -> SamplerResult<Vec<SampleResult>>
    where
        F: Fn(&GeoPoint) -> SamplerResult<SampleResult> + Send + Sync,
    {
        if points.len() >= self.config.parallel_threshold {
            points.par_iter().map(f).collect()
        } else {
            points.iter().map(f).collect()
        }
    }
}

fn check_radius(radius_km: f64) -> SamplerResult<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(SamplerError::invalid_parameter(
            "radius_km",
            format!("must be a finite value >= 0, got {}", radius_km),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerMetadata;
    use crate::loader::MemoryLayerLoader;
    use climate_common::{CellSize, GridOrigin, RasterGrid};

    /// 4x4 one-degree grid at the equator, value = row * 10 + col, one no-data cell.
    fn engine() -> SamplingEngine<MemoryLayerLoader> {
        let metadata = LayerMetadata {
            origin: GridOrigin::new(2.0, -2.0),
            cell_size: CellSize::square(1.0),
            rows: 4,
            cols: 4,
            nodata: Some(-1.0),
        };
        let mut data: Vec<f64> = (0..16).map(|i| ((i / 4) * 10 + i % 4) as f64).collect();
        data[5] = -1.0;
        let raster = RasterGrid::new(4, 4, data).unwrap();
        let loader = MemoryLayerLoader::new().with_layer("grid", metadata, raster);
        SamplingEngine::with_loader(SamplerConfig::default(), loader)
    }

    #[test]
    fn test_sample_value_order_and_missing() {
        let engine = engine();
        let points = [
            GeoPoint::new(1.5, -1.5),
            GeoPoint::new(0.5, -0.5),
            GeoPoint::new(-1.5, 1.5),
        ];
        let values = engine.sample_value("grid", &points).unwrap();
        assert_eq!(
            values,
            vec![
                SampleResult::Value(0.0),
                SampleResult::Missing,
                SampleResult::Value(33.0)
            ]
        );
    }

    #[test]
    fn test_unknown_layer() {
        let engine = engine();
        assert!(matches!(
            engine.sample_value("nope", &[GeoPoint::new(0.0, 0.0)]),
            Err(SamplerError::LayerNotFound { .. })
        ));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let engine = engine();
        let points = [GeoPoint::new(0.5, 0.5)];
        assert!(matches!(
            engine.sample_average("grid", &points, -1.0),
            Err(SamplerError::InvalidParameter { .. })
        ));
        assert!(engine.sample_variance("grid", &points, f64::NAN).is_err());
    }

    #[test]
    fn test_average_skips_nodata() {
        let engine = engine();
        // (0, 0) is the shared corner of cells (1,1)=nodata, (1,2)=12, (2,1)=21, (2,2)=22;
        // their centers are ~79 km away.
        let result = engine
            .sample_average("grid", &[GeoPoint::new(0.0, 0.0)], 80.0)
            .unwrap();
        assert_eq!(result, vec![SampleResult::Value((12.0 + 21.0 + 22.0) / 3.0)]);
    }

    #[test]
    fn test_variance_of_neighborhood() {
        let engine = engine();
        let result = engine
            .sample_variance("grid", &[GeoPoint::new(0.0, 0.0)], 80.0)
            .unwrap();
        let values = [12.0, 21.0, 22.0];
        let m = values.iter().sum::<f64>() / 3.0;
        let expected = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / 3.0;
        let actual = result[0].value().unwrap();
        assert!((actual - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_points() {
        let engine = engine();
        assert!(engine.sample_value("grid", &[]).unwrap().is_empty());
        assert!(engine.sample_average("grid", &[], 10.0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.sample_value("grid", &[GeoPoint::new(91.0, 0.0)]),
            Err(SamplerError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let mut config = SamplerConfig::default();
        config.parallel_threshold = 1;
        let loader = engine().cache.loader().clone();
        let parallel = SamplingEngine::with_loader(config, loader);
        let sequential = engine();

        let points: Vec<GeoPoint> = (0..40)
            .map(|i| GeoPoint::new(1.9 - (i % 4) as f64, -1.9 + (i / 10) as f64))
            .collect();
        assert_eq!(
            parallel.sample_average("grid", &points, 120.0).unwrap(),
            sequential.sample_average("grid", &points, 120.0).unwrap()
        );
    }

    #[test]
    fn test_layer_loaded_once() {
        let engine = engine();
        let p = [GeoPoint::new(0.5, 0.5)];
        engine.sample_value("grid", &p).unwrap();
        engine.sample_average("grid.bil", &p, 0.0).unwrap();
        engine.sample_variance_default("grid", &p).unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 2);
    }
}
