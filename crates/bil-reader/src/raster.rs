//! Decoding of band 1 from a `.bil` data file.

use std::path::Path;

use climate_common::RasterGrid;
use tracing::debug;

use crate::error::{BilError, BilResult};
use crate::header::{BilHeader, ByteOrder, Layout, PixelType};

/// Read band 1 of the data file described by `header`.
pub fn read_band(path: impl AsRef<Path>, header: &BilHeader) -> BilResult<RasterGrid> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read BIL data file");
    decode_band(&bytes, header)
}

/// Decode band 1 from an in-memory copy of the data file.
pub fn decode_band(bytes: &[u8], header: &BilHeader) -> BilResult<RasterGrid> {
    let bps = header.bytes_per_sample();
    let (row_stride, col_stride) = strides(header)?;

    let last = last_sample_end(header, row_stride, col_stride)?;
    if (bytes.len() as u64) < last {
        return Err(BilError::Truncated {
            expected: last,
            actual: bytes.len() as u64,
        });
    }

    let mut data = Vec::with_capacity(header.nrows * header.ncols);
    for row in 0..header.nrows as u64 {
        let row_start = header.skip_bytes + row * row_stride;
        for col in 0..header.ncols as u64 {
            let offset = (row_start + col * col_stride) as usize;
            data.push(decode_sample(&bytes[offset..offset + bps], header));
        }
    }

    RasterGrid::new(header.nrows, header.ncols, data).ok_or_else(|| BilError::InvalidValue {
        key: "NROWS/NCOLS".to_string(),
        value: format!("{}x{}", header.nrows, header.ncols),
    })
}

/// Offset just past the last sample of band 1.
///
/// Every term comes from the header, so overflow is reported rather than wrapped.
fn last_sample_end(header: &BilHeader, row_stride: u64, col_stride: u64) -> BilResult<u64> {
    let overflow = || BilError::InvalidValue {
        key: "NROWS/NCOLS/SKIPBYTES".to_string(),
        value: format!(
            "{}/{}/{} exceeds addressable size",
            header.nrows, header.ncols, header.skip_bytes
        ),
    };

    (header.nrows as u64 - 1)
        .checked_mul(row_stride)
        .and_then(|rows| {
            (header.ncols as u64 - 1)
                .checked_mul(col_stride)
                .and_then(|cols| rows.checked_add(cols))
        })
        .and_then(|end| end.checked_add(header.skip_bytes))
        .and_then(|end| end.checked_add(header.bytes_per_sample() as u64))
        .ok_or_else(overflow)
}

/// Byte distance between consecutive rows and consecutive columns of band 1.
fn strides(header: &BilHeader) -> BilResult<(u64, u64)> {
    let bps = header.bytes_per_sample() as u64;
    let ncols = header.ncols as u64;
    let nbands = header.nbands as u64;
    let overflow = || BilError::InvalidValue {
        key: "NCOLS/NBANDS".to_string(),
        value: format!("{}/{}", header.ncols, header.nbands),
    };

    let strides = match header.layout {
        Layout::Bil => {
            // Rows may not overlap.
            let min_row = ncols.checked_mul(bps).ok_or_else(overflow)?;
            if header.total_row_bytes < min_row {
                return Err(BilError::InvalidValue {
                    key: "TOTALROWBYTES".to_string(),
                    value: header.total_row_bytes.to_string(),
                });
            }
            (header.total_row_bytes, bps)
        }
        Layout::Bip => {
            let pixel = nbands.checked_mul(bps).ok_or_else(overflow)?;
            (ncols.checked_mul(pixel).ok_or_else(overflow)?, pixel)
        }
        Layout::Bsq => (ncols.checked_mul(bps).ok_or_else(overflow)?, bps),
    };
    Ok(strides)
}

fn decode_sample(raw: &[u8], header: &BilHeader) -> f64 {
    macro_rules! read {
        ($ty:ty, $n:expr) => {{
            let mut buf = [0u8; $n];
            buf.copy_from_slice(raw);
            match header.byte_order {
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(buf),
                ByteOrder::BigEndian => <$ty>::from_be_bytes(buf),
            }
        }};
    }

    match (header.pixel_type, header.nbits) {
        (PixelType::SignedInt, 8) => f64::from(read!(i8, 1)),
        (PixelType::UnsignedInt, 8) => f64::from(read!(u8, 1)),
        (PixelType::SignedInt, 16) => f64::from(read!(i16, 2)),
        (PixelType::UnsignedInt, 16) => f64::from(read!(u16, 2)),
        (PixelType::SignedInt, 32) => f64::from(read!(i32, 4)),
        (PixelType::UnsignedInt, 32) => f64::from(read!(u32, 4)),
        (PixelType::Float, 32) => f64::from(read!(f32, 4)),
        (PixelType::Float, 64) => read!(f64, 8),
        // Rejected when the header was parsed.
        _ => f64::NAN,
    }
}
