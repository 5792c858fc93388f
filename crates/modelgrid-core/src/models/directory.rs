//! Lazily loaded, session-wide cache of model descriptors.
//!
//! The first caller of [`ModelDirectory::ensure_loaded`] starts the fetch; every
//! caller that arrives while it is in flight awaits that same fetch. Once
//! populated the index is reused until [`ModelDirectory::invalidate`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backend::ModelDescriptor;
use crate::error::Result;

/// Descriptors keyed by lowercased model name.
pub type ModelIndex = HashMap<String, ModelDescriptor>;

/// Build an index. Names that collide case-insensitively keep the last entry.
pub fn index_models(models: Vec<ModelDescriptor>) -> ModelIndex {
    let mut index = ModelIndex::with_capacity(models.len());
    for model in models {
        index.insert(model.name.to_lowercase(), model);
    }
    index
}

type Slot = Arc<OnceCell<Arc<ModelIndex>>>;

#[derive(Debug, Default)]
pub struct ModelDirectory {
    slot: Mutex<Slot>,
}

impl ModelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index, fetching it with `fetch` if nothing is cached.
    ///
    /// A failed fetch caches nothing, so the next caller retries. A fetch that
    /// returned no models also counts as "nothing cached".
    pub async fn ensure_loaded<F, Fut>(&self, fetch: F) -> Result<Arc<ModelIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ModelDescriptor>>>,
    {
        let slot = self.current_slot();
        let index = slot
            .get_or_try_init(|| async move {
                let models = fetch().await?;
                info!(count = models.len(), "model directory loaded");
                Ok::<_, crate::ModelGridError>(Arc::new(index_models(models)))
            })
            .await?;
        Ok(Arc::clone(index))
    }

    fn current_slot(&self) -> Slot {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.get().is_some_and(|index| index.is_empty()) {
            debug!("model directory is empty, refetching");
            *slot = Slot::default();
        }
        Arc::clone(&slot)
    }

    /// Case-insensitive lookup in the cached index. Never fetches.
    pub fn lookup(&self, name: &str) -> Option<ModelDescriptor> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get()?.get(&name.to_lowercase()).cloned()
    }

    pub fn is_loaded(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.initialized()
    }

    /// Drop the cached index; the next `ensure_loaded` fetches again.
    /// Fetches already in flight still complete into the old slot.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Slot::default();
        info!("model directory invalidated");
    }
}
