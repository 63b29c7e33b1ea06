use std::sync::Arc;

use crate::services::RecommendationEngine;

/// Shared application state
///
/// The engine owns only immutable structures (catalog, feature index,
/// resolver) plus the provider's internally synchronized cache, so handlers
/// share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
