//! ESRI `.hdr` sidecar parsing.
//!
//! The header is a list of `KEYWORD value` lines. Keywords are case-insensitive
//! and unknown keywords are ignored. Georeferencing keywords (`ULXMAP`, `ULYMAP`,
//! `XDIM`, `YDIM`) are required because every sampled layer is a lat/lon grid.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use climate_common::{CellSize, GridOrigin};
use tracing::warn;

use crate::error::{BilError, BilResult};

/// Order of bytes within multi-byte samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// `I` / `LSBFIRST` (Intel)
    LittleEndian,
    /// `M` / `MSBFIRST` (Motorola)
    BigEndian,
}

/// Interpretation of each sample's bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    SignedInt,
    UnsignedInt,
    Float,
}

/// How bands are interleaved in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Band interleaved by line
    Bil,
    /// Band interleaved by pixel
    Bip,
    /// Band sequential
    Bsq,
}

/// Parsed contents of a `.hdr` file.
#[derive(Debug, Clone, PartialEq)]
pub struct BilHeader {
    pub nrows: usize,
    pub ncols: usize,
    pub nbands: usize,
    pub nbits: u32,
    pub pixel_type: PixelType,
    pub byte_order: ByteOrder,
    pub layout: Layout,
    pub skip_bytes: u64,
    pub band_row_bytes: u64,
    pub total_row_bytes: u64,
    /// Longitude of the center of the upper-left cell.
    pub ulxmap: f64,
    /// Latitude of the center of the upper-left cell.
    pub ulymap: f64,
    /// Cell width in degrees.
    pub xdim: f64,
    /// Cell height in degrees.
    pub ydim: f64,
    pub nodata: Option<f64>,
}

impl BilHeader {
    /// Read and parse a header file.
    pub fn read(path: impl AsRef<Path>) -> BilResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse header text.
    pub fn parse(text: &str) -> BilResult<Self> {
        let entries = parse_entries(text);

        let nrows = required_usize(&entries, "NROWS")?;
        let ncols = required_usize(&entries, "NCOLS")?;
        let nbands = optional_parse::<usize>(&entries, "NBANDS")?.unwrap_or(1);
        let nbits = optional_parse::<u32>(&entries, "NBITS")?.unwrap_or(8);

        if nrows == 0 || ncols == 0 || nbands == 0 {
            return Err(BilError::InvalidValue {
                key: "NROWS/NCOLS/NBANDS".to_string(),
                value: format!("{}/{}/{}", nrows, ncols, nbands),
            });
        }

        let pixel_type = match entries.get("PIXELTYPE").map(|s| s.to_ascii_uppercase()) {
            None => PixelType::UnsignedInt,
            Some(v) if v == "SIGNEDINT" => PixelType::SignedInt,
            Some(v) if v == "UNSIGNEDINT" => PixelType::UnsignedInt,
            Some(v) if v == "FLOAT" => PixelType::Float,
            Some(v) => {
                return Err(BilError::InvalidValue {
                    key: "PIXELTYPE".to_string(),
                    value: v,
                })
            }
        };

        let byte_order = match entries.get("BYTEORDER").map(|s| s.to_ascii_uppercase()) {
            None => ByteOrder::LittleEndian,
            Some(v) if v == "I" || v == "LSBFIRST" => ByteOrder::LittleEndian,
            Some(v) if v == "M" || v == "MSBFIRST" => ByteOrder::BigEndian,
            Some(v) => {
                return Err(BilError::InvalidValue {
                    key: "BYTEORDER".to_string(),
                    value: v,
                })
            }
        };

        let layout = match entries.get("LAYOUT").map(|s| s.to_ascii_uppercase()) {
            None => Layout::Bil,
            Some(v) if v == "BIL" => Layout::Bil,
            Some(v) if v == "BIP" => Layout::Bip,
            Some(v) if v == "BSQ" => Layout::Bsq,
            Some(v) => {
                return Err(BilError::InvalidValue {
                    key: "LAYOUT".to_string(),
                    value: v,
                })
            }
        };

        check_pixel_format(pixel_type, nbits)?;

        let bytes_per_sample = u64::from(nbits / 8);
        let band_row_bytes = match optional_parse::<u64>(&entries, "BANDROWBYTES")? {
            Some(bytes) => bytes,
            None => checked_product(ncols as u64, bytes_per_sample, "NCOLS")?,
        };
        let total_row_bytes = match optional_parse::<u64>(&entries, "TOTALROWBYTES")? {
            Some(bytes) => bytes,
            None => checked_product(band_row_bytes, nbands as u64, "BANDROWBYTES")?,
        };
        let skip_bytes = optional_parse::<u64>(&entries, "SKIPBYTES")?.unwrap_or(0);

        if nbands > 1 {
            warn!(nbands, "Multi-band raster, only band 1 will be sampled");
        }

        Ok(Self {
            nrows,
            ncols,
            nbands,
            nbits,
            pixel_type,
            byte_order,
            layout,
            skip_bytes,
            band_row_bytes,
            total_row_bytes,
            ulxmap: required_f64(&entries, "ULXMAP")?,
            ulymap: required_f64(&entries, "ULYMAP")?,
            xdim: required_f64(&entries, "XDIM")?,
            ydim: required_f64(&entries, "YDIM")?,
            nodata: optional_parse::<f64>(&entries, "NODATA")?,
        })
    }

    /// Bytes occupied by one sample.
    pub fn bytes_per_sample(&self) -> usize {
        (self.nbits / 8) as usize
    }

    /// Upper-left corner of the raster (the header names the upper-left cell center).
    pub fn upper_left_corner(&self) -> GridOrigin {
        GridOrigin::new(self.ulymap + self.ydim / 2.0, self.ulxmap - self.xdim / 2.0)
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize::new(self.ydim, self.xdim)
    }

    /// The no-data sentinel as the pixel type stores it.
    ///
    /// Decoded cells are exact, so a sentinel such as `-9999.9` in a 32-bit
    /// float raster must be rounded to `f32` before it can match a cell.
    pub fn native_nodata(&self) -> Option<f64> {
        self.nodata.map(|value| match (self.pixel_type, self.nbits) {
            (PixelType::Float, 32) => f64::from(value as f32),
            _ => value,
        })
    }
}

/// Sidecar header path for a data file: `bio1.bil` -> `bio1.hdr`.
pub fn header_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("hdr")
}

fn parse_entries(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let key = parts.next()?;
            let value = parts.next()?;
            Some((key.to_ascii_uppercase(), value.to_string()))
        })
        .collect()
}

fn optional_parse<T: std::str::FromStr>(
    entries: &HashMap<String, String>,
    key: &'static str,
) -> BilResult<Option<T>> {
    match entries.get(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| BilError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

fn required_usize(entries: &HashMap<String, String>, key: &'static str) -> BilResult<usize> {
    optional_parse::<usize>(entries, key)?.ok_or(BilError::MissingKey(key))
}

fn required_f64(entries: &HashMap<String, String>, key: &'static str) -> BilResult<f64> {
    let value = optional_parse::<f64>(entries, key)?.ok_or(BilError::MissingKey(key))?;
    if !value.is_finite() {
        return Err(BilError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn checked_product(a: u64, b: u64, key: &'static str) -> BilResult<u64> {
    a.checked_mul(b).ok_or_else(|| BilError::InvalidValue {
        key: key.to_string(),
        value: a.to_string(),
    })
}

fn check_pixel_format(pixel_type: PixelType, nbits: u32) -> BilResult<()> {
    let supported = match pixel_type {
        PixelType::SignedInt | PixelType::UnsignedInt => matches!(nbits, 8 | 16 | 32),
        PixelType::Float => matches!(nbits, 32 | 64),
    };
    if supported {
        Ok(())
    } else {
        Err(BilError::UnsupportedFormat(format!(
            "{:?} with {} bits",
            pixel_type, nbits
        )))
    }
}
