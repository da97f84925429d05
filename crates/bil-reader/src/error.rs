//! Error types for BIL reading operations.

use climate_common::SamplerError;
use thiserror::Error;

/// Result type for BIL reader operations.
pub type BilResult<T> = Result<T, BilError>;

/// Error types for BIL/HDR parsing.
#[derive(Error, Debug)]
pub enum BilError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Required header keyword absent
    #[error("Missing header key: {0}")]
    MissingKey(&'static str),

    /// Header keyword present but unusable
    #[error("Invalid value for header key {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Pixel type / bit depth combination we cannot decode
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Data file shorter than the header promises
    #[error("Raster data truncated: expected at least {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },
}

impl From<BilError> for SamplerError {
    fn from(err: BilError) -> Self {
        match err {
            BilError::IoError(e) => SamplerError::Io(e),
            BilError::MissingKey(_) | BilError::InvalidValue { .. } => {
                SamplerError::InvalidMetadata(err.to_string())
            }
            BilError::UnsupportedFormat(_) | BilError::Truncated { .. } => {
                SamplerError::ReadFailed(err.to_string())
            }
        }
    }
}
