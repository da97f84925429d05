//! Reader for ESRI band-interleaved rasters (`.bil` + `.hdr`).
//!
//! Climate layers such as the WorldClim/BIOCLIM variables are distributed as a
//! raw binary data file with a plain-text header sidecar of the same stem.
//! This crate parses the header and decodes the first band into a
//! [`RasterGrid`] of `f64` values, so every supported pixel type is
//! represented exactly.
//!
//! # Example
//!
//! ```ignore
//! use bil_reader::BilDataset;
//!
//! let dataset = BilDataset::open("data/bio1.bil")?;
//! println!("{} x {}", dataset.header.nrows, dataset.header.ncols);
//! ```

pub mod error;
pub mod header;
pub mod raster;

use std::path::{Path, PathBuf};

use climate_common::RasterGrid;

pub use error::{BilError, BilResult};
pub use header::{header_path, BilHeader, ByteOrder, Layout, PixelType};
pub use raster::{decode_band, read_band};

/// Storage extension of BIL data files.
pub const BIL_EXTENSION: &str = "bil";

/// A header together with its decoded first band.
#[derive(Debug, Clone)]
pub struct BilDataset {
    pub path: PathBuf,
    pub header: BilHeader,
    pub raster: RasterGrid,
}

impl BilDataset {
    /// Read the `.hdr` sidecar and the data file at `path`.
    pub fn open(path: impl AsRef<Path>) -> BilResult<Self> {
        let path = path.as_ref();
        let header = BilHeader::read(header_path(path))?;
        let raster = read_band(path, &header)?;
        Ok(Self {
            path: path.to_path_buf(),
            header,
            raster,
        })
    }
}
