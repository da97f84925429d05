//! Sampling results.

use serde::{Deserialize, Serialize};

/// Outcome of sampling one point: a value, or missing.
///
/// Missing covers both a no-data cell and a neighborhood with no valid cells.
/// It serializes as `null`, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleResult {
    Value(f64),
    Missing,
}

impl SampleResult {
    /// The sampled value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            SampleResult::Value(v) => Some(*v),
            SampleResult::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, SampleResult::Missing)
    }
}

impl From<Option<f64>> for SampleResult {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => SampleResult::Value(v),
            None => SampleResult::Missing,
        }
    }
}

impl std::fmt::Display for SampleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleResult::Value(v) => write!(f, "{}", v),
            SampleResult::Missing => write!(f, "missing"),
        }
    }
}
