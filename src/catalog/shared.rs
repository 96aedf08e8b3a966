use crate::catalog::PriceCatalog;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holder for the current catalog. Readers get an `Arc` snapshot; a reload
/// replaces the whole catalog at once.
#[derive(Clone)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Arc<PriceCatalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: PriceCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub async fn snapshot(&self) -> Arc<PriceCatalog> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, catalog: PriceCatalog) {
        *self.inner.write().await = Arc::new(catalog);
    }
}
