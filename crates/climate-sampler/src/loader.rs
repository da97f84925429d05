//! Locating and loading layers.
//!
//! Loading is split into two collaborators so each can be swapped out:
//! a [`PathResolver`] turns a layer name into a data file and a
//! [`RasterSource`] reads its georeferencing and cells. [`FileLayerLoader`]
//! wires them together for `.bil` files on disk; [`MemoryLayerLoader`]
//! serves prebuilt rasters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bil_reader::{BilDataset, BilHeader, BIL_EXTENSION};
use climate_common::{RasterGrid, SamplerError, SamplerResult};
use tracing::{info, instrument};

use crate::config::SamplerConfig;
use crate::layer::{Layer, LayerMetadata, DEFAULT_NODATA};

/// Finds the data file for a layer name.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, name: &str) -> SamplerResult<PathBuf>;
}

/// Reads a data file: origin, cell size, extent and no-data sentinel,
/// together with the decoded cells.
pub trait RasterSource: Send + Sync {
    fn read(&self, path: &Path) -> SamplerResult<(LayerMetadata, RasterGrid)>;
}

/// Produces a fully built [`Layer`] for a name.
pub trait LayerLoader: Send + Sync {
    fn load(&self, name: &str) -> SamplerResult<Layer>;
}

/// Cache key for a layer name: `bio1` and `bio1.bil` are the same layer.
pub fn layer_key(name: &str) -> &str {
    let suffix = format!(".{}", BIL_EXTENSION);
    name.strip_suffix(suffix.as_str()).unwrap_or(name)
}

/// File name for a layer name, adding the `.bil` extension when absent.
pub fn data_file_name(name: &str) -> String {
    format!("{}.{}", layer_key(name), BIL_EXTENSION)
}

// ============================================================================
// Path resolution
// ============================================================================

/// Searches configured data directories, then the working directory.
#[derive(Debug, Clone, Default)]
pub struct DataPaths {
    data_dirs: Vec<PathBuf>,
    search_working_dir: bool,
}

impl DataPaths {
    pub fn new(data_dirs: Vec<PathBuf>, search_working_dir: bool) -> Self {
        Self {
            data_dirs,
            search_working_dir,
        }
    }

    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(config.data_dirs.clone(), config.search_working_dir)
    }

    /// Every location that would be tried for `name`, in order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let file = PathBuf::from(data_file_name(name));
        if file.is_absolute() {
            return vec![file];
        }

        let mut candidates: Vec<PathBuf> = self.data_dirs.iter().map(|d| d.join(&file)).collect();
        if self.search_working_dir {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            candidates.push(cwd.join(&file));
        }
        candidates
    }
}

impl PathResolver for DataPaths {
    fn resolve(&self, name: &str) -> SamplerResult<PathBuf> {
        let candidates = self.candidates(name);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(SamplerError::layer_not_found(name, candidates)),
        }
    }
}

// ============================================================================
// BIL collaborators
// ============================================================================

/// Georeferencing described by a BIL header.
///
/// The sentinel is rounded to the pixel type so it compares equal to the
/// decoded cells that carry it.
pub fn metadata_from_header(header: &BilHeader) -> LayerMetadata {
    LayerMetadata {
        origin: header.upper_left_corner(),
        cell_size: header.cell_size(),
        rows: header.nrows,
        cols: header.ncols,
        nodata: header.native_nodata(),
    }
}

/// Reads the `.hdr` sidecar once and decodes band 1 of a `.bil` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BilRasterSource;

impl RasterSource for BilRasterSource {
    fn read(&self, path: &Path) -> SamplerResult<(LayerMetadata, RasterGrid)> {
        let dataset = BilDataset::open(path)?;
        Ok((metadata_from_header(&dataset.header), dataset.raster))
    }
}

// ============================================================================
// Loaders
// ============================================================================

/// Loads layers from files: resolve, then read header and cells.
#[derive(Debug, Clone)]
pub struct FileLayerLoader<R = DataPaths, S = BilRasterSource> {
    resolver: R,
    source: S,
    default_nodata: f64,
}

impl FileLayerLoader {
    /// `.bil` loader searching the directories named in `config`.
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(DataPaths::from_config(config), BilRasterSource)
            .with_default_nodata(config.default_nodata)
    }
}

impl<R, S> FileLayerLoader<R, S>
where
    R: PathResolver,
    S: RasterSource,
{
    pub fn new(resolver: R, source: S) -> Self {
        Self {
            resolver,
            source,
            default_nodata: DEFAULT_NODATA,
        }
    }

    pub fn with_default_nodata(mut self, nodata: f64) -> Self {
        self.default_nodata = nodata;
        self
    }
}

impl<R, S> LayerLoader for FileLayerLoader<R, S>
where
    R: PathResolver,
    S: RasterSource,
{
    #[instrument(skip(self))]
    fn load(&self, name: &str) -> SamplerResult<Layer> {
        let path = self.resolver.resolve(name)?;
        let (metadata, raster) = self.source.read(&path)?;
        let layer = Layer::new(layer_key(name), metadata, raster, self.default_nodata)?
            .with_source(&path);

        info!(
            layer = layer.name(),
            path = %path.display(),
            rows = metadata.rows,
            cols = metadata.cols,
            nodata = layer.nodata(),
            "Loaded layer"
        );
        Ok(layer)
    }
}

/// Serves layers from rasters held in memory.
#[derive(Debug, Clone)]
pub struct MemoryLayerLoader {
    layers: HashMap<String, (LayerMetadata, RasterGrid)>,
    default_nodata: f64,
}

impl MemoryLayerLoader {
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
            default_nodata: DEFAULT_NODATA,
        }
    }

    /// Register a layer under `name` (with or without the `.bil` extension).
    pub fn with_layer(mut self, name: &str, metadata: LayerMetadata, raster: RasterGrid) -> Self {
        self.layers
            .insert(layer_key(name).to_string(), (metadata, raster));
        self
    }
}

impl Default for MemoryLayerLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerLoader for MemoryLayerLoader {
    fn load(&self, name: &str) -> SamplerResult<Layer> {
        let key = layer_key(name);
        let (metadata, raster) = self
            .layers
            .get(key)
            .ok_or_else(|| SamplerError::layer_not_found(name, Vec::new()))?;
        Layer::new(key, *metadata, raster.clone(), self.default_nodata)
    }
}
