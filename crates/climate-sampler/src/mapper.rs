//! Geographic point to raster cell mapping.
//!
//! Rasters are north-up and west-left: the origin is the upper-left corner of
//! cell `[0, 0]`, latitude decreases as the row grows and longitude increases
//! with the column. Cells are half-open, so a point on the boundary between
//! two cells belongs to the southern/eastern one.

use climate_common::{CellIndex, CellSize, GeoPoint, GridOrigin, SamplerError, SamplerResult};

/// Unchecked `(row, col)` of the cell containing `point`.
///
/// The result may lie outside any raster; use [`CoordinateMapper::to_index`]
/// to get a validated [`CellIndex`].
pub fn raw_index(point: GeoPoint, origin: GridOrigin, cell_size: CellSize) -> (i64, i64) {
    let row = ((origin.lat - point.lat) / cell_size.lat_step).floor() as i64;
    let col = ((point.lon - origin.lon) / cell_size.lon_step).floor() as i64;
    (row, col)
}

/// Center of the cell at an unchecked `(row, col)`.
pub fn raw_cell_center(row: i64, col: i64, origin: GridOrigin, cell_size: CellSize) -> GeoPoint {
    GeoPoint::new(
        origin.lat - (row as f64 + 0.5) * cell_size.lat_step,
        origin.lon + (col as f64 + 0.5) * cell_size.lon_step,
    )
}

/// Grid geometry of one layer: origin, cell size and extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    origin: GridOrigin,
    cell_size: CellSize,
    rows: usize,
    cols: usize,
}

impl CoordinateMapper {
    pub fn new(origin: GridOrigin, cell_size: CellSize, rows: usize, cols: usize) -> Self {
        Self {
            origin,
            cell_size,
            rows,
            cols,
        }
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell index for `point`, or an `OutOfBounds` error outside the raster.
    pub fn to_index(&self, point: GeoPoint) -> SamplerResult<CellIndex> {
        let (row, col) = raw_index(point, self.origin, self.cell_size);
        self.checked(row, col).ok_or(SamplerError::OutOfBounds {
            point,
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Cell index for `point`, or `None` outside the raster.
    pub fn try_index(&self, point: GeoPoint) -> Option<CellIndex> {
        let (row, col) = raw_index(point, self.origin, self.cell_size);
        self.checked(row, col)
    }

    /// Geographic center of a cell.
    pub fn cell_center(&self, index: CellIndex) -> GeoPoint {
        raw_cell_center(index.row as i64, index.col as i64, self.origin, self.cell_size)
    }

    /// Whether the grid wraps all the way around in longitude.
    pub fn is_global(&self) -> bool {
        (self.cols as f64 * self.cell_size.lon_step - 360.0).abs() < self.cell_size.lon_step / 2.0
    }

    fn checked(&self, row: i64, col: i64) -> Option<CellIndex> {
        if row < 0 || col < 0 || row as u64 >= self.rows as u64 || col as u64 >= self.cols as u64 {
            return None;
        }
        Some(CellIndex::new(row as usize, col as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_half_degree() -> CoordinateMapper {
        CoordinateMapper::new(GridOrigin::new(90.0, -180.0), CellSize::square(0.5), 360, 720)
    }

    #[test]
    fn test_known_indices() {
        let mapper = global_half_degree();
        assert_eq!(
            mapper.to_index(GeoPoint::new(10.0, 10.0)).unwrap(),
            CellIndex::new(160, 380)
        );
        assert_eq!(
            mapper.to_index(GeoPoint::new(0.0, 0.0)).unwrap(),
            CellIndex::new(180, 360)
        );
        assert_eq!(
            mapper.to_index(GeoPoint::new(90.0, -180.0)).unwrap(),
            CellIndex::new(0, 0)
        );
        assert_eq!(
            mapper.to_index(GeoPoint::new(-89.9, 179.9)).unwrap(),
            CellIndex::new(359, 719)
        );
    }

    #[test]
    fn test_cell_interior_maps_to_same_cell() {
        let mapper = global_half_degree();
        let a = mapper.to_index(GeoPoint::new(10.49, 10.01)).unwrap();
        let b = mapper.to_index(GeoPoint::new(10.01, 10.49)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, CellIndex::new(159, 380));
    }

    #[test]
    fn test_out_of_bounds_is_explicit() {
        let mapper = global_half_degree();

        // Southern and eastern edges are exclusive.
        match mapper.to_index(GeoPoint::new(-90.0, 0.0)) {
            Err(SamplerError::OutOfBounds { row, rows, .. }) => {
                assert_eq!(row, 360);
                assert_eq!(rows, 360);
            }
            other => panic!("expected OutOfBounds, got {:?}", other),
        }
        assert!(mapper.to_index(GeoPoint::new(0.0, 180.0)).is_err());
        assert!(mapper.try_index(GeoPoint::new(0.0, 180.0)).is_none());
    }

    #[test]
    fn test_regional_grid_rejects_outside_points() {
        let mapper = CoordinateMapper::new(GridOrigin::new(50.0, -10.0), CellSize::square(1.0), 20, 30);
        assert_eq!(
            mapper.to_index(GeoPoint::new(45.5, 0.5)).unwrap(),
            CellIndex::new(4, 10)
        );
        assert!(mapper.to_index(GeoPoint::new(51.0, 0.0)).is_err());
        assert!(mapper.to_index(GeoPoint::new(40.0, -11.0)).is_err());
        assert!(mapper.to_index(GeoPoint::new(29.5, 0.0)).is_err());
    }

    #[test]
    fn test_cell_center_round_trip() {
        let mapper = global_half_degree();
        for row in (0..360).step_by(7) {
            for col in (0..720).step_by(13) {
                let index = CellIndex::new(row, col);
                let center = mapper.cell_center(index);
                assert_eq!(mapper.to_index(center).unwrap(), index);
            }
        }
    }

    #[test]
    fn test_cell_center_round_trip_uneven_steps() {
        let mapper = CoordinateMapper::new(
            GridOrigin::new(90.0, -180.0),
            CellSize::new(1.0 / 6.0, 1.0 / 12.0),
            1080,
            4320,
        );
        for (row, col) in [(0, 0), (539, 2160), (1079, 4319), (333, 1234)] {
            let index = CellIndex::new(row, col);
            assert_eq!(mapper.to_index(mapper.cell_center(index)).unwrap(), index);
        }
    }

    #[test]
    fn test_is_global() {
        assert!(global_half_degree().is_global());
        let regional = CoordinateMapper::new(GridOrigin::new(50.0, -10.0), CellSize::square(1.0), 20, 30);
        assert!(!regional.is_global());
    }
}
