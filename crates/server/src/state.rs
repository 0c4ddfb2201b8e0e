//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::Store;
use crate::services::OrderIngestor;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store and the order ingestor built on top of it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    ingestor: OrderIngestor,
}

impl AppState {
    /// Create application state with the default ingestor for `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        let ingestor = OrderIngestor::with_store(Arc::clone(&store));
        Self::with_ingestor(store, ingestor)
    }

    /// Create application state with a preconfigured ingestor.
    #[must_use]
    pub fn with_ingestor(store: Arc<dyn Store>, ingestor: OrderIngestor) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, ingestor }),
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the order ingestor.
    #[must_use]
    pub fn ingestor(&self) -> &OrderIngestor {
        &self.inner.ingestor
    }
}
