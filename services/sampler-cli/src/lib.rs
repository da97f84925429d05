//! Support code for the `climate-sample` command.

pub mod output;
pub mod points;

pub use output::{pair_results, to_json, LayerInfo, PointSample};
pub use points::{parse_point, read_points, PointParseError};
