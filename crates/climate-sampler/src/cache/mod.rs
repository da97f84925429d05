//! Caching of loaded layers.

pub mod layer_cache;

pub use layer_cache::{LayerCache, LayerCacheStats};
