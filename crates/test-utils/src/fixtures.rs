//! On-disk layer fixtures.
//!
//! Writes ESRI `.bil` + `.hdr` pairs the way WorldClim distributes them, so
//! tests exercise the real loading path instead of an in-memory stand-in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use climate_common::{CellIndex, RasterGrid};

use crate::generators::create_gradient_grid;

/// Sample encoding of a fixture layer, always written little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixturePixel {
    UInt8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl FixturePixel {
    /// `NBITS` and `PIXELTYPE` header values.
    pub fn header_format(self) -> (usize, &'static str) {
        match self {
            FixturePixel::UInt8 => (8, "UNSIGNEDINT"),
            FixturePixel::Int16 => (16, "SIGNEDINT"),
            FixturePixel::Int32 => (32, "SIGNEDINT"),
            FixturePixel::Float32 => (32, "FLOAT"),
            FixturePixel::Float64 => (64, "FLOAT"),
        }
    }

    /// Little-endian bytes of one cell. Integer types saturate.
    pub fn encode_value(self, value: f64) -> Vec<u8> {
        match self {
            FixturePixel::UInt8 => vec![value as u8],
            FixturePixel::Int16 => (value as i16).to_le_bytes().to_vec(),
            FixturePixel::Int32 => (value as i32).to_le_bytes().to_vec(),
            FixturePixel::Float32 => (value as f32).to_le_bytes().to_vec(),
            FixturePixel::Float64 => value.to_le_bytes().to_vec(),
        }
    }
}

/// Georeferencing and encoding of a fixture layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilFixture {
    /// Latitude of the top edge of row 0.
    pub origin_lat: f64,
    /// Longitude of the left edge of column 0.
    pub origin_lon: f64,
    pub cell_size: f64,
    pub nodata: Option<f64>,
    pub pixel: FixturePixel,
}

impl BilFixture {
    /// WorldClim-style global layer: origin (90, -180), int16, nodata -9999.
    pub fn global(cell_size: f64) -> Self {
        Self {
            origin_lat: 90.0,
            origin_lon: -180.0,
            cell_size,
            nodata: Some(NODATA),
            pixel: FixturePixel::Int16,
        }
    }

    /// Regional layer with its upper-left corner at (`origin_lat`, `origin_lon`).
    pub fn regional(origin_lat: f64, origin_lon: f64, cell_size: f64) -> Self {
        Self {
            origin_lat,
            origin_lon,
            cell_size,
            ..Self::global(cell_size)
        }
    }

    pub fn with_pixel(mut self, pixel: FixturePixel) -> Self {
        self.pixel = pixel;
        self
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Header text for a raster of the given size.
    ///
    /// ULXMAP/ULYMAP name the center of the upper-left cell, as in the format.
    pub fn header_text(&self, rows: usize, cols: usize) -> String {
        let (nbits, pixel_type) = self.pixel.header_format();
        let half = self.cell_size / 2.0;
        let mut text = format!(
            "BYTEORDER      I\n\
             LAYOUT         BIL\n\
             NROWS          {rows}\n\
             NCOLS          {cols}\n\
             NBANDS         1\n\
             NBITS          {nbits}\n\
             BANDROWBYTES   {row_bytes}\n\
             TOTALROWBYTES  {row_bytes}\n\
             PIXELTYPE      {pixel_type}\n\
             ULXMAP         {ulx}\n\
             ULYMAP         {uly}\n\
             XDIM           {dim}\n\
             YDIM           {dim}\n",
            row_bytes = cols * nbits / 8,
            ulx = self.origin_lon + half,
            uly = self.origin_lat - half,
            dim = self.cell_size,
        );
        if let Some(nodata) = self.nodata {
            text.push_str(&format!("NODATA         {}\n", nodata));
        }
        text
    }

    /// Row-major cell bytes in the fixture's encoding.
    pub fn encode(&self, grid: &RasterGrid) -> Vec<u8> {
        grid.values()
            .iter()
            .flat_map(|v| self.pixel.encode_value(*v))
            .collect()
    }
}

/// Writes `{name}.bil` and `{name}.hdr` into `dir` and returns the `.bil` path.
pub fn write_bil_layer(
    dir: &Path,
    name: &str,
    fixture: &BilFixture,
    grid: &RasterGrid,
) -> io::Result<PathBuf> {
    let bil = dir.join(format!("{}.bil", name));
    fs::write(&bil, fixture.encode(grid))?;
    fs::write(
        dir.join(format!("{}.hdr", name)),
        fixture.header_text(grid.rows(), grid.cols()),
    )?;
    Ok(bil)
}

/// No-data sentinel used by the fixtures.
pub const NODATA: f64 = -9999.0;

/// The global 0.5 degree scenario layer.
///
/// 360 rows x 720 columns with origin (90, -180). Background values follow
/// `row * 10 + col`; a few cells are overridden so that well-known points
/// have well-known answers (see [`scenario`]).
pub mod scenario {
    use super::*;

    pub const ROWS: usize = 360;
    pub const COLS: usize = 720;
    pub const CELL_SIZE: f64 = 0.5;

    /// (10, 10) falls in cell (160, 380).
    pub const POINT_VALUE_CELL: (usize, usize) = (160, 380);
    pub const POINT_VALUE: f64 = 257.0;

    /// (0, 0) falls in cell (180, 360), which holds no data.
    pub const OCEAN_CELL: (usize, usize) = (180, 360);

    /// (20, 20) falls in cell (140, 400).
    pub const OUTLIER_CELL: (usize, usize) = (140, 400);
    pub const OUTLIER_VALUE: f64 = 249.0;

    /// Builds the in-memory raster.
    pub fn grid() -> RasterGrid {
        let mut grid = create_gradient_grid(ROWS, COLS);
        grid.set(CellIndex::new(POINT_VALUE_CELL.0, POINT_VALUE_CELL.1), POINT_VALUE);
        grid.set(CellIndex::new(OCEAN_CELL.0, OCEAN_CELL.1), NODATA);
        grid.set(CellIndex::new(OUTLIER_CELL.0, OUTLIER_CELL.1), OUTLIER_VALUE);
        grid
    }

    /// Background value of a cell before overrides.
    pub fn gradient_value(row: usize, col: usize) -> f64 {
        (row * 10 + col) as f64
    }

    /// Writes the scenario layer as `{name}.bil`/`{name}.hdr` into `dir`.
    pub fn write(dir: &Path, name: &str) -> io::Result<PathBuf> {
        write_bil_layer(dir, name, &BilFixture::global(CELL_SIZE), &grid())
    }
}
