//! Loaded raster layers.

use std::path::{Path, PathBuf};

use climate_common::{
    CellIndex, CellSize, GeoPoint, GridOrigin, RasterGrid, SampleResult, SamplerError,
    SamplerResult,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mapper::CoordinateMapper;
use crate::neighborhood::points_within_distance;

/// No-data sentinel assumed when a layer's metadata does not declare one.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// Georeferencing of a layer as reported by its metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// Upper-left corner of the raster.
    pub origin: GridOrigin,
    pub cell_size: CellSize,
    pub rows: usize,
    pub cols: usize,
    /// Declared no-data sentinel, if any.
    pub nodata: Option<f64>,
}

/// An immutable named raster with its grid geometry.
///
/// Layers are built once by a loader and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    mapper: CoordinateMapper,
    nodata: f64,
    raster: RasterGrid,
    source: Option<PathBuf>,
}

impl Layer {
    /// Build a layer from metadata and decoded cells.
    ///
    /// `default_nodata` is used when the metadata carries no sentinel
    /// (normally [`DEFAULT_NODATA`]). Fails if the cell size is not positive or
    /// the raster dimensions disagree with the metadata.
    pub fn new(
        name: impl Into<String>,
        metadata: LayerMetadata,
        raster: RasterGrid,
        default_nodata: f64,
    ) -> SamplerResult<Self> {
        let name = name.into();

        if !metadata.cell_size.is_valid() {
            return Err(SamplerError::invalid_metadata(format!(
                "{}: cell size must be positive, got {:?}",
                name, metadata.cell_size
            )));
        }
        if !metadata.origin.lat.is_finite() || !metadata.origin.lon.is_finite() {
            return Err(SamplerError::invalid_metadata(format!(
                "{}: origin must be finite, got {:?}",
                name, metadata.origin
            )));
        }
        if metadata.rows != raster.rows() || metadata.cols != raster.cols() {
            return Err(SamplerError::invalid_metadata(format!(
                "{}: metadata declares {}x{} cells but raster has {}x{}",
                name,
                metadata.rows,
                metadata.cols,
                raster.rows(),
                raster.cols()
            )));
        }

        Ok(Self {
            name,
            mapper: CoordinateMapper::new(
                metadata.origin,
                metadata.cell_size,
                metadata.rows,
                metadata.cols,
            ),
            nodata: metadata.nodata.unwrap_or(default_nodata),
            raster,
            source: None,
        })
    }

    /// Record the file the layer was read from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn raster(&self) -> &RasterGrid {
        &self.raster
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn metadata(&self) -> LayerMetadata {
        LayerMetadata {
            origin: self.mapper.origin(),
            cell_size: self.mapper.cell_size(),
            rows: self.mapper.rows(),
            cols: self.mapper.cols(),
            nodata: Some(self.nodata),
        }
    }

    /// Value of a cell, or `None` for no-data (the sentinel or NaN) and
    /// indices outside the raster.
    pub fn value_at(&self, index: CellIndex) -> Option<f64> {
        let value = self.raster.get(index)?;
        if value.is_nan() || value == self.nodata {
            None
        } else {
            Some(value)
        }
    }

    /// Value of the cell containing `point`.
    pub fn sample(&self, point: GeoPoint) -> SamplerResult<SampleResult> {
        point.validate()?;
        let index = self.mapper.to_index(point)?;
        Ok(self.value_at(index).into())
    }

    /// Valid values of every cell within `radius_km` of `center`.
    ///
    /// The center must lie inside the raster. Neighborhood cells falling
    /// outside the raster (regional layers) are not part of the layer and are
    /// skipped, as are no-data cells.
    pub fn neighborhood_values(&self, center: GeoPoint, radius_km: f64) -> SamplerResult<Vec<f64>> {
        center.validate()?;
        self.mapper.to_index(center)?;

        let candidates = points_within_distance(
            center,
            radius_km,
            self.mapper.origin(),
            self.mapper.cell_size(),
        );
        let values: Vec<f64> = candidates
            .iter()
            .filter_map(|p| self.mapper.try_index(*p))
            .filter_map(|index| self.value_at(index))
            .collect();

        debug!(
            layer = %self.name,
            lat = center.lat,
            lon = center.lon,
            radius_km,
            cells = candidates.len(),
            valid = values.len(),
            "Collected neighborhood"
        );

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(rows: usize, cols: usize, nodata: Option<f64>) -> LayerMetadata {
        LayerMetadata {
            origin: GridOrigin::new(10.0, 0.0),
            cell_size: CellSize::square(1.0),
            rows,
            cols,
            nodata,
        }
    }

    #[test]
    fn test_default_nodata_applied() {
        let layer = Layer::new("t", metadata(2, 2, None), RasterGrid::filled(2, 2, 1.0), DEFAULT_NODATA)
            .unwrap();
        assert_eq!(layer.nodata(), -9999.0);

        let layer = Layer::new("t", metadata(2, 2, Some(-1.0)), RasterGrid::filled(2, 2, 1.0), DEFAULT_NODATA)
            .unwrap();
        assert_eq!(layer.nodata(), -1.0);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = Layer::new("t", metadata(3, 2, None), RasterGrid::filled(2, 2, 1.0), DEFAULT_NODATA)
            .unwrap_err();
        assert!(matches!(err, SamplerError::InvalidMetadata(_)));
    }

    #[test]
    fn test_invalid_cell_size_rejected() {
        let mut meta = metadata(2, 2, None);
        meta.cell_size = CellSize::new(0.0, 1.0);
        assert!(Layer::new("t", meta, RasterGrid::filled(2, 2, 1.0), DEFAULT_NODATA).is_err());
    }

    #[test]
    fn test_value_at_excludes_nodata_and_nan() {
        let raster = RasterGrid::new(1, 3, vec![5.0, -9999.0, f64::NAN]).unwrap();
        let layer = Layer::new("t", metadata(1, 3, None), raster, DEFAULT_NODATA).unwrap();

        assert_eq!(layer.value_at(CellIndex::new(0, 0)), Some(5.0));
        assert_eq!(layer.value_at(CellIndex::new(0, 1)), None);
        assert_eq!(layer.value_at(CellIndex::new(0, 2)), None);
        assert_eq!(layer.value_at(CellIndex::new(0, 3)), None);
    }

    #[test]
    fn test_sample_point() {
        let raster = RasterGrid::new(2, 2, vec![1.0, 2.0, 3.0, -9999.0]).unwrap();
        let layer = Layer::new("t", metadata(2, 2, None), raster, DEFAULT_NODATA).unwrap();

        assert_eq!(layer.sample(GeoPoint::new(9.5, 0.5)).unwrap(), SampleResult::Value(1.0));
        assert_eq!(layer.sample(GeoPoint::new(8.5, 0.5)).unwrap(), SampleResult::Value(3.0));
        assert_eq!(layer.sample(GeoPoint::new(8.5, 1.5)).unwrap(), SampleResult::Missing);
        assert!(matches!(
            layer.sample(GeoPoint::new(7.5, 0.5)),
            Err(SamplerError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_metadata_reports_effective_nodata() {
        let layer = Layer::new("t", metadata(2, 2, None), RasterGrid::filled(2, 2, 1.0), DEFAULT_NODATA)
            .unwrap()
            .with_source("/data/t.bil");
        assert_eq!(layer.metadata().nodata, Some(-9999.0));
        assert_eq!(layer.source(), Some(Path::new("/data/t.bil")));
    }
}
