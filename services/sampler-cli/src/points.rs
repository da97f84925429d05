//! Parsing of query points from arguments and text input.

use std::io::BufRead;

use climate_common::GeoPoint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointParseError {
    #[error("line {line}: expected 'LAT,LON', got '{input}'")]
    Malformed { line: usize, input: String },

    #[error("line {line}: {message}")]
    OutOfRange { line: usize, message: String },

    #[error("failed to read points: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse `LAT,LON` (comma and/or whitespace separated).
pub fn parse_point(input: &str) -> Result<GeoPoint, PointParseError> {
    parse_line(input, 1)
}

/// Read one point per line. Blank lines and `#` comments are skipped.
pub fn read_points<R: BufRead>(reader: R) -> Result<Vec<GeoPoint>, PointParseError> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        points.push(parse_line(trimmed, i + 1)?);
    }
    Ok(points)
}

fn parse_line(input: &str, line: usize) -> Result<GeoPoint, PointParseError> {
    let malformed = || PointParseError::Malformed {
        line,
        input: input.to_string(),
    };

    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(malformed());
    };
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    let lon: f64 = lon.parse().map_err(|_| malformed())?;

    let point = GeoPoint::new(lat, lon);
    point.validate().map_err(|e| PointParseError::OutOfRange {
        line,
        message: e.to_string(),
    })?;
    Ok(point)
}
