//! Cache of import-resolved manifests.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use super::model::{Manifest, Scope};

/// Cache key: canonical manifest path plus the scope view, if any.
///
/// `scope: None` is the full import-resolved manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub scope: Option<Scope>,
}

impl CacheKey {
    pub fn resolved(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scope: None,
        }
    }

    pub fn filtered(path: impl Into<PathBuf>, scope: Scope) -> Self {
        Self {
            path: path.into(),
            scope: Some(scope),
        }
    }
}

/// Storage for parsed manifests.
///
/// Parsing is a pure function of file content, so concurrent `put`s for
/// the same key store equal values and last-write-wins is fine.
pub trait ManifestCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<Manifest>>;
    fn put(&self, key: CacheKey, manifest: Arc<Manifest>);
    fn clear(&self);
}

/// Thread-safe map shared by every store that holds it.
#[derive(Default)]
pub struct SharedCache {
    manifests: DashMap<CacheKey, Arc<Manifest>>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

impl ManifestCache for SharedCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<Manifest>> {
        self.manifests.get(key).map(|r| Arc::clone(&r))
    }

    fn put(&self, key: CacheKey, manifest: Arc<Manifest>) {
        self.manifests.insert(key, manifest);
    }

    fn clear(&self) {
        self.manifests.clear();
    }
}

/// Cache that never stores anything; every load reparses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ManifestCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<Arc<Manifest>> {
        None
    }

    fn put(&self, _key: CacheKey, _manifest: Arc<Manifest>) {}

    fn clear(&self) {}
}

/// Process-wide manifest cache.
pub static SHARED_CACHE: LazyLock<Arc<SharedCache>> = LazyLock::new(|| Arc::new(SharedCache::new()));
