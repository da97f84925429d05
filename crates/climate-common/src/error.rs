//! Error types for climate raster sampling.

use std::path::PathBuf;

use thiserror::Error;

use crate::geo::GeoPoint;

/// Result type alias using SamplerError.
pub type SamplerResult<T> = Result<T, SamplerError>;

/// Primary error type for sampling operations.
#[derive(Debug, Error)]
pub enum SamplerError {
    // === Lookup Errors ===
    #[error("Layer not found: {name} (searched: {})", format_searched(.searched))]
    LayerNotFound { name: String, searched: Vec<PathBuf> },

    // === Request Errors ===
    #[error("Point {point} maps to cell ({row}, {col}) outside raster of {rows}x{cols}")]
    OutOfBounds {
        point: GeoPoint,
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid coordinate {point}: {message}")]
    InvalidCoordinate { point: GeoPoint, message: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Invalid layer metadata: {0}")]
    InvalidMetadata(String),

    #[error("Failed to read raster data: {0}")]
    ReadFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SamplerError {
    /// Create a LayerNotFound error.
    pub fn layer_not_found(name: impl Into<String>, searched: Vec<PathBuf>) -> Self {
        Self::LayerNotFound {
            name: name.into(),
            searched,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Whether this error is caused by the caller's request rather than the data.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            SamplerError::OutOfBounds { .. }
                | SamplerError::InvalidCoordinate { .. }
                | SamplerError::InvalidParameter { .. }
        )
    }
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "nothing".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_not_found_lists_search_locations() {
        let err = SamplerError::layer_not_found(
            "bio1",
            vec![PathBuf::from("/data/bio1.bil"), PathBuf::from("./bio1.bil")],
        );
        let msg = err.to_string();
        assert!(msg.contains("bio1"));
        assert!(msg.contains("/data/bio1.bil"));
        assert!(msg.contains("./bio1.bil"));
    }

    #[test]
    fn test_layer_not_found_without_locations() {
        let err = SamplerError::layer_not_found("bio1", Vec::new());
        assert!(err.to_string().contains("searched: nothing"));
    }

    #[test]
    fn test_request_error_classification() {
        let oob = SamplerError::OutOfBounds {
            point: GeoPoint::new(0.0, 0.0),
            row: -1,
            col: 3,
            rows: 10,
            cols: 10,
        };
        assert!(oob.is_request_error());
        assert!(SamplerError::invalid_parameter("radius", "negative").is_request_error());
        assert!(!SamplerError::read_failed("short file").is_request_error());
    }
}
