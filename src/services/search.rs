use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
    backend::StorefrontBackend, config::AppConfig, errors::ServiceError, models::ProductSummary,
};

/// Debounced, cancellable product search suggestions.
///
/// Each keystroke calls [`suggest`](SuggestionService::suggest); only the
/// most recent call survives the debounce window, and a response for a
/// superseded query is dropped rather than displayed. Stale results can
/// therefore never overwrite fresher ones, regardless of response order.
#[derive(Clone)]
pub struct SuggestionService {
    backend: Arc<dyn StorefrontBackend>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    results: Arc<RwLock<Vec<ProductSummary>>>,
}

impl SuggestionService {
    pub fn new(backend: Arc<dyn StorefrontBackend>, config: &AppConfig) -> Self {
        Self {
            backend,
            debounce: Duration::from_millis(config.search_debounce_ms),
            generation: Arc::new(AtomicU64::new(0)),
            results: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Submits a query. Returns `Ok(None)` when a newer query superseded
    /// this one (during the debounce window or while the request was in
    /// flight); `Ok(Some(..))` carries the suggestions now visible.
    ///
    /// A blank query clears the suggestions immediately, without a request.
    #[instrument(skip(self))]
    pub async fn suggest(
        &self,
        query: &str,
    ) -> Result<Option<Vec<ProductSummary>>, ServiceError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.trim().is_empty() {
            self.results.write().await.clear();
            return Ok(Some(Vec::new()));
        }

        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Query {:?} superseded during debounce", query);
            return Ok(None);
        }

        let found = self.backend.search_products(query.trim()).await?;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Query {:?} superseded while in flight", query);
            return Ok(None);
        }

        *self.results.write().await = found.clone();
        Ok(Some(found))
    }

    /// The suggestions currently visible.
    pub async fn visible(&self) -> Vec<ProductSummary> {
        self.results.read().await.clone()
    }
}
