//! Test data generators for creating synthetic climate-like rasters.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite.

use climate_common::{CellIndex, RasterGrid};

/// Creates a raster whose value is `row * 10 + col`.
///
/// Neighbouring rows differ by 10 and neighbouring columns by 1, so any
/// neighborhood larger than one cell has a non-zero variance and the variance
/// of a disk grows with its radius.
///
/// # Example
///
/// ```
/// use climate_common::CellIndex;
/// use test_utils::create_gradient_grid;
///
/// let grid = create_gradient_grid(4, 5);
/// assert_eq!(grid.len(), 20);
/// assert_eq!(grid.get(CellIndex::new(0, 1)), Some(1.0));
/// assert_eq!(grid.get(CellIndex::new(2, 3)), Some(23.0));
/// ```
pub fn create_gradient_grid(rows: usize, cols: usize) -> RasterGrid {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 10 + col) as f64);
        }
    }
    RasterGrid::new(rows, cols, data).expect("dimensions match by construction")
}

/// Sets every cell in the inclusive row/column block to `value`.
pub fn fill_block(
    grid: &mut RasterGrid,
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
    value: f64,
) {
    for row in rows {
        for col in cols.clone() {
            grid.set(CellIndex::new(row, col), value);
        }
    }
}
