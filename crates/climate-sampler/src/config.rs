//! Configuration for the sampling engine.

use std::path::{Path, PathBuf};

use climate_common::{SamplerError, SamplerResult};
use serde::{Deserialize, Serialize};

use crate::layer::DEFAULT_NODATA;

/// Configuration for the sampling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Directories searched (in order) for layer data files.
    pub data_dirs: Vec<PathBuf>,

    /// Also search the process working directory after `data_dirs`.
    pub search_working_dir: bool,

    /// Neighborhood radius used when the caller does not give one.
    pub default_radius_km: f64,

    /// Variance is reported missing for points with |lat| above this.
    pub polar_variance_cutoff_deg: f64,

    /// No-data sentinel for layers whose header does not declare one.
    pub default_nodata: f64,

    /// Batches with at least this many points are evaluated in parallel.
    pub parallel_threshold: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            data_dirs: Vec::new(),
            search_working_dir: true,
            default_radius_km: 40.0,
            polar_variance_cutoff_deg: 60.0,
            default_nodata: DEFAULT_NODATA,
            parallel_threshold: 256,
        }
    }
}

impl SamplerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay any `CLIMATE_*` environment variables onto this configuration.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env(&mut self) {
        if let Some(val) = std::env::var_os("CLIMATE_DATA_DIR") {
            self.data_dirs = std::env::split_paths(&val)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("CLIMATE_SEARCH_CWD") {
            self.search_working_dir = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("CLIMATE_DEFAULT_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                self.default_radius_km = radius;
            }
        }

        if let Ok(val) = std::env::var("CLIMATE_POLAR_CUTOFF_DEG") {
            if let Ok(cutoff) = val.parse() {
                self.polar_variance_cutoff_deg = cutoff;
            }
        }

        if let Ok(val) = std::env::var("CLIMATE_DEFAULT_NODATA") {
            if let Ok(nodata) = val.parse() {
                self.default_nodata = nodata;
            }
        }

        if let Ok(val) = std::env::var("CLIMATE_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.parallel_threshold = threshold;
            }
        }
    }

    /// Load configuration from a YAML file. Absent fields keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SamplerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| {
            SamplerError::invalid_parameter("config", format!("{}: {}", path.display(), e))
        })
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> SamplerResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| SamplerError::invalid_parameter("config", e.to_string()))
    }

    /// Add a data directory to the end of the search list.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dirs.push(dir.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SamplerResult<()> {
        if !self.default_radius_km.is_finite() || self.default_radius_km < 0.0 {
            return Err(SamplerError::invalid_parameter(
                "default_radius_km",
                "must be a finite value >= 0",
            ));
        }

        if !(0.0..=90.0).contains(&self.polar_variance_cutoff_deg) {
            return Err(SamplerError::invalid_parameter(
                "polar_variance_cutoff_deg",
                "must be within [0, 90]",
            ));
        }

        if self.parallel_threshold == 0 {
            return Err(SamplerError::invalid_parameter(
                "parallel_threshold",
                "must be > 0",
            ));
        }

        Ok(())
    }
}
