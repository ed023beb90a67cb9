//! Shared state handed to every handler.

use std::sync::Arc;

use crate::cache::ResultCache;
use crate::models::Config;
use crate::pipeline::BulkOrchestrator;
use crate::services::{ListingFetcher, ResultFetcher};

pub struct AppState {
    pub config: Arc<Config>,
    pub cache: ResultCache,
    pub results: Arc<dyn ResultFetcher>,
    pub listings: Arc<dyn ListingFetcher>,
    pub bulk: BulkOrchestrator,
}

impl AppState {
    /// Wire the collaborators together; the bulk orchestrator shares the
    /// cache and result fetcher.
    pub fn new(
        config: Arc<Config>,
        cache: ResultCache,
        results: Arc<dyn ResultFetcher>,
        listings: Arc<dyn ListingFetcher>,
    ) -> Self {
        let bulk = BulkOrchestrator::new(
            cache.clone(),
            Arc::clone(&results),
            config.ttl.clone(),
            config.bulk.max_span,
        );
        Self {
            config,
            cache,
            results,
            listings,
            bulk,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache)
            .field("bulk", &self.bulk)
            .finish_non_exhaustive()
    }
}
