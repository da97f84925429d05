//! Load-once cache of layers keyed by name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use climate_common::SamplerResult;
use tracing::debug;

use crate::layer::Layer;
use crate::loader::{layer_key, LayerLoader};

/// Statistics about the layer cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerCacheStats {
    /// Layers loaded through the loader.
    pub loads: u64,
    /// Requests served from already loaded layers.
    pub hits: u64,
    /// Layers currently held.
    pub entries: usize,
}

/// Cache of loaded layers.
///
/// Each distinct layer name is loaded at most once, even with concurrent
/// callers: a per-name lock serialises the first load while lookups of other
/// names proceed. Entries are never evicted; layers are immutable once loaded.
/// Failed loads are not cached, and the per-name lock is dropped once the
/// load it guarded has finished either way.
pub struct LayerCache<L> {
    loader: L,
    layers: RwLock<HashMap<String, Arc<Layer>>>,
    loading: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    loads: AtomicU64,
    hits: AtomicU64,
}

impl<L: LayerLoader> LayerCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            layers: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
            loads: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// The loaded layer for `name`, loading it on first use.
    pub fn get_or_load(&self, name: &str) -> SamplerResult<Arc<Layer>> {
        let key = layer_key(name);

        if let Some(layer) = self.cached(key) {
            return Ok(layer);
        }

        let slot = {
            let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
            loading.entry(key.to_string()).or_default().clone()
        };
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished loading while we waited.
        if let Some(layer) = self.cached(key) {
            return Ok(layer);
        }

        let result = self.loader.load(key).map(|layer| {
            let layer = Arc::new(layer);
            self.layers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string(), Arc::clone(&layer));
            self.loads.fetch_add(1, Ordering::Relaxed);
            layer
        });
        self.release_slot(key, &slot);

        result
    }

    /// Whether `name` has been loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.layers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(layer_key(name))
    }

    /// Names of all loaded layers.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .layers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> LayerCacheStats {
        LayerCacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            entries: self.layers.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Forget the per-name lock unless a newer load has replaced it.
    fn release_slot(&self, key: &str, slot: &Arc<Mutex<()>>) {
        let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        if loading.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            loading.remove(key);
        }
    }

    fn cached(&self, key: &str) -> Option<Arc<Layer>> {
        let layer = self
            .layers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(layer = key, "Layer cache hit");
        Some(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LayerMetadata, DEFAULT_NODATA};
    use climate_common::{CellSize, GridOrigin, RasterGrid, SamplerError};
    use std::sync::atomic::AtomicUsize;

    /// Loader that counts calls and knows a single layer, "bio1".
    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl LayerLoader for CountingLoader {
        fn load(&self, name: &str) -> SamplerResult<Layer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if name != "bio1" {
                return Err(SamplerError::layer_not_found(name, Vec::new()));
            }
            // Give concurrent callers a chance to pile up on the slot lock.
            std::thread::sleep(std::time::Duration::from_millis(20));
            let metadata = LayerMetadata {
                origin: GridOrigin::new(90.0, -180.0),
                cell_size: CellSize::square(180.0),
                rows: 1,
                cols: 2,
                nodata: None,
            };
            Layer::new(name, metadata, RasterGrid::filled(1, 2, 1.0), DEFAULT_NODATA)
        }
    }

    fn cache() -> LayerCache<CountingLoader> {
        LayerCache::new(CountingLoader {
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_loads_once_per_name() {
        let cache = cache();
        let a = cache.get_or_load("bio1").unwrap();
        let b = cache.get_or_load("bio1.bil").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            LayerCacheStats {
                loads: 1,
                hits: 1,
                entries: 1
            }
        );
        assert!(cache.contains("bio1.bil"));
        assert_eq!(cache.names(), vec!["bio1".to_string()]);
    }

    #[test]
    fn test_failed_load_not_cached() {
        let cache = cache();
        assert!(cache.get_or_load("missing").is_err());
        assert!(cache.get_or_load("missing").is_err());

        assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("missing"));
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_load_slots_released() {
        let cache = cache();
        for i in 0..100 {
            assert!(cache.get_or_load(&format!("missing{}", i)).is_err());
        }
        cache.get_or_load("bio1").unwrap();

        assert!(cache.loading.lock().unwrap().is_empty());
        assert_eq!(cache.names(), vec!["bio1".to_string()]);
    }

    #[test]
    fn test_concurrent_first_load_happens_once() {
        let cache = Arc::new(cache());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_load("bio1").map(|_| ()))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().loads, 1);
        assert_eq!(cache.stats().hits, 7);
    }
}
