//! Atomically swappable catalog snapshot.
//!
//! Readers take an `Arc<Catalog>` once per resolution and keep it for the whole call, so a
//! concurrent reload never exposes a half-updated catalog. A failed reload leaves the
//! previous snapshot in place.

use super::{load_catalog, Catalog};
use crate::error::CatalogResult;
use arc_swap::ArcSwap;
use std::path::Path;
use std::sync::Arc;

/// Cheap-to-clone handle to the current catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<ArcSwap<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(catalog)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Catalog::empty())
    }

    /// Current snapshot. Hold on to it for the duration of one resolution.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Replace the snapshot. In-flight resolutions keep the one they already hold.
    pub fn install(&self, catalog: Catalog) {
        self.current.store(Arc::new(catalog));
    }

    /// Load from `root` and install on success; on error the old snapshot stays live.
    pub fn reload_from(&self, root: &Path) -> CatalogResult<Arc<Catalog>> {
        match load_catalog(root) {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                self.current.store(Arc::clone(&catalog));
                tracing::info!("[CATALOG] Snapshot swapped from {}", root.display());
                Ok(catalog)
            }
            Err(e) => {
                tracing::error!("[CATALOG] Reload failed, keeping previous snapshot: {}", e);
                Err(e)
            }
        }
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::empty()
    }
}
