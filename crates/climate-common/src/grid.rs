//! Regular lat/lon grid descriptors and raster storage.

use serde::{Deserialize, Serialize};

/// Upper-left corner of a north-up raster, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridOrigin {
    pub lat: f64,
    pub lon: f64,
}

impl GridOrigin {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Angular size of one cell: degrees of latitude per row and of longitude per column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub lat_step: f64,
    pub lon_step: f64,
}

impl CellSize {
    pub fn new(lat_step: f64, lon_step: f64) -> Self {
        Self { lat_step, lon_step }
    }

    /// Square cells of `step` degrees on both axes.
    pub fn square(step: f64) -> Self {
        Self::new(step, step)
    }

    /// Both steps are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.lat_step.is_finite()
            && self.lon_step.is_finite()
            && self.lat_step > 0.0
            && self.lon_step > 0.0
    }
}

/// Row/column position of a cell in a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// Decoded single-band raster in row-major order (row 0 is the northern edge).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl RasterGrid {
    /// Wrap row-major cell values. Returns `None` if `data` is not `rows * cols` long.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if rows.checked_mul(cols)? != data.len() {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// A raster with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the index addresses a cell of this raster.
    pub fn contains(&self, index: CellIndex) -> bool {
        index.row < self.rows && index.col < self.cols
    }

    /// Cell value, or `None` when the index is outside the raster.
    pub fn get(&self, index: CellIndex) -> Option<f64> {
        if !self.contains(index) {
            return None;
        }
        self.data.get(index.row * self.cols + index.col).copied()
    }

    /// Overwrite a single cell. Returns false when the index is outside the raster.
    pub fn set(&mut self, index: CellIndex, value: f64) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.data[index.row * self.cols + index.col] = value;
        true
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
