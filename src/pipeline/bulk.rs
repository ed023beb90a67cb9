//! Bulk range orchestrator.
//!
//! A bulk request names a contiguous hallticket range. The first request
//! for a range stores a loading placeholder under the aggregate key and
//! starts a background worker; callers poll the same URL until the
//! placeholder is replaced by the JSON array of results.
//!
//! ```text
//! run(request)
//!   ├── aggregate cached        -> Cached(raw)
//!   ├── every per-id cached     -> Assembled(values)
//!   └── otherwise               -> start or join worker, Pending(raw)
//! ```
//!
//! Per-hallticket entries live under the `/api/calculate` key of the same
//! query, stored as `{"data": ...}` envelopes.
//!
//! Workers are deduplicated per aggregate key: concurrent misses for the
//! same range join the computation already in flight. The worker itself
//! writes the placeholder before fetching, so a joining request never
//! overwrites an aggregate the worker has already stored.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{ResultCache, keys};
use crate::error::Result;
use crate::models::{BulkRequest, DataEnvelope, HallticketRange, StudentResult, TtlConfig};
use crate::services::{ResultFetcher, compute_metric};

/// Body stored under the aggregate key while a worker runs.
pub const LOADING_PLACEHOLDER: &str = r#"{"result":"loading"}"#;

type Job = Shared<BoxFuture<'static, ()>>;

/// What a bulk request resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOutcome {
    /// Aggregate entry found, returned verbatim
    Cached(String),
    /// Every hallticket already cached individually
    Assembled(Vec<Value>),
    /// Worker started or joined; body is the current aggregate entry
    Pending(String),
}

struct Inner {
    cache: ResultCache,
    results: Arc<dyn ResultFetcher>,
    ttl: TtlConfig,
    max_span: u32,
    in_flight: DashMap<String, Job>,
}

/// Shared entry point for bulk range requests.
#[derive(Clone)]
pub struct BulkOrchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for BulkOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkOrchestrator")
            .field("max_span", &self.inner.max_span)
            .field("in_flight", &self.inner.in_flight.len())
            .finish()
    }
}

impl BulkOrchestrator {
    pub fn new(cache: ResultCache, results: Arc<dyn ResultFetcher>, ttl: TtlConfig, max_span: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                results,
                ttl,
                max_span,
                in_flight: DashMap::new(),
            }),
        }
    }

    /// Resolve a bulk request without waiting for the worker.
    pub async fn run(&self, request: &BulkRequest) -> Result<BulkOutcome> {
        let range = HallticketRange::parse(
            &request.hallticket_from,
            &request.hallticket_to,
            self.inner.max_span,
        )?;
        let key = keys::bulk_range(request);
        let cache = &self.inner.cache;

        if let Some(raw) = cache.get(&key).await {
            debug!(key = %key, "Bulk aggregate cache hit");
            return Ok(BulkOutcome::Cached(raw));
        }

        if let Some(values) = self.assemble(&range, request).await {
            debug!(key = %key, count = values.len(), "Bulk range assembled from per-hallticket entries");
            return Ok(BulkOutcome::Assembled(values));
        }

        self.ensure_worker(&key, range, request.clone());

        let body = cache
            .get(&key)
            .await
            .unwrap_or_else(|| LOADING_PLACEHOLDER.to_string());
        Ok(BulkOutcome::Pending(body))
    }

    /// Await the worker for `key`, if one is running. Returns whether one was.
    pub async fn wait_for(&self, key: &str) -> bool {
        let job = self.inner.in_flight.get(key).map(|job| job.value().clone());
        match job {
            Some(job) => {
                job.await;
                true
            }
            None => false,
        }
    }

    /// Await every running worker.
    pub async fn drain(&self) {
        loop {
            let jobs: Vec<Job> = self
                .inner
                .in_flight
                .iter()
                .map(|job| job.value().clone())
                .collect();
            if jobs.is_empty() {
                return;
            }
            info!(count = jobs.len(), "Waiting for bulk workers");
            future::join_all(jobs).await;
        }
    }

    /// Number of workers currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Every per-hallticket entry of the range, or `None` if any is missing.
    async fn assemble(&self, range: &HallticketRange, request: &BulkRequest) -> Option<Vec<Value>> {
        let lookups = range.halltickets().map(|hallticket| {
            let key = keys::bulk_item(&request.exam_query(&hallticket));
            async move {
                self.inner
                    .cache
                    .get_json::<DataEnvelope<Value>>(&key)
                    .await
                    .map(|entry| entry.data)
            }
        });
        future::join_all(lookups).await.into_iter().collect()
    }

    fn ensure_worker(&self, key: &str, range: HallticketRange, request: BulkRequest) {
        let job = match self.inner.in_flight.entry(key.to_string()) {
            Entry::Occupied(_) => {
                debug!(key, "Joining in-flight bulk worker");
                return;
            }
            Entry::Vacant(slot) => {
                let inner = Arc::clone(&self.inner);
                let key = key.to_string();
                let job: Job = async move {
                    inner
                        .cache
                        .set(&key, LOADING_PLACEHOLDER, inner.ttl.bulk())
                        .await;
                    inner.work(&key, &range, &request).await;
                    inner.in_flight.remove(&key);
                }
                .boxed()
                .shared();
                slot.insert(job.clone());
                job
            }
        };
        tokio::spawn(job);
    }
}

impl Inner {
    async fn work(&self, key: &str, range: &HallticketRange, request: &BulkRequest) {
        info!(
            key,
            prefix = range.prefix(),
            count = range.count(),
            "Bulk worker started"
        );

        let mut collected: Vec<StudentResult> = Vec::with_capacity(range.count());
        for hallticket in range.halltickets() {
            let query = request.exam_query(&hallticket);
            match self.results.fetch_exam(&query).await {
                Ok(result) if result.is_empty() => {
                    debug!(hallticket = %hallticket, "No result published");
                }
                Ok(result) => {
                    let result = compute_metric(result);
                    self.cache
                        .set_json(
                            &keys::bulk_item(&query),
                            &DataEnvelope { data: &result },
                            self.ttl.result(),
                        )
                        .await;
                    collected.push(result);
                }
                Err(e) => {
                    warn!(hallticket = %hallticket, error = %e, "Bulk fetch failed, skipping");
                }
            }
        }

        if collected.is_empty() {
            warn!(key, "Bulk worker found no results, clearing placeholder");
            self.cache.delete(key).await;
        } else {
            self.cache.set_json(key, &collected, self.ttl.bulk()).await;
            info!(key, fetched = collected.len(), "Bulk worker finished");
        }
    }
}
