//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use result_crawler::cache::{CacheError, CacheResult, CacheService, MokaCacheService, ResultCache};
use result_crawler::error::{AppError, Result};
use result_crawler::models::{
    Config, ExamLink, ExamQuery, ListingSet, Notification, SemesterResult, StudentResult,
    SubjectGrade,
};
use result_crawler::services::{ListingFetcher, ResultFetcher};
use result_crawler::web::{AppState, create_app};

/// How a fake collaborator answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Empty,
    Error,
    NotFound,
}

fn sample_result(hallticket: &str, period: &str, grade: &str) -> StudentResult {
    let mut semester = SemesterResult::default();
    semester.subjects.insert(
        "MA101BS".to_string(),
        SubjectGrade {
            subject_name: "MATHEMATICS - I".to_string(),
            grade: grade.to_string(),
            credits: 4.0,
            ..SubjectGrade::default()
        },
    );
    semester.subjects.insert(
        "CS102ES".to_string(),
        SubjectGrade {
            subject_name: "PROGRAMMING FOR PROBLEM SOLVING".to_string(),
            grade: "O".to_string(),
            credits: 4.0,
            ..SubjectGrade::default()
        },
    );

    let mut result = StudentResult::default();
    result.student_details.hallticket = hallticket.to_string();
    result.student_details.name = "TEST STUDENT".to_string();
    result.results.insert(period.to_string(), semester);
    result
}

/// Result fetcher with call counters and a switchable mode.
pub struct FakeResults {
    mode: Mutex<Mode>,
    latency: Duration,
    pub year_calls: AtomicUsize,
    pub exam_calls: AtomicUsize,
    pub all_calls: AtomicUsize,
    pub exam_queries: Mutex<Vec<ExamQuery>>,
}

impl FakeResults {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            mode: Mutex::new(Mode::Normal),
            latency,
            year_calls: AtomicUsize::new(0),
            exam_calls: AtomicUsize::new(0),
            all_calls: AtomicUsize::new(0),
            exam_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn year_calls(&self) -> usize {
        self.year_calls.load(Ordering::SeqCst)
    }

    pub fn exam_calls(&self) -> usize {
        self.exam_calls.load(Ordering::SeqCst)
    }

    pub fn all_calls(&self) -> usize {
        self.all_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, hallticket: &str, period: &str) -> Result<StudentResult> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::Normal => Ok(sample_result(hallticket, period, "A")),
            Mode::Empty => Ok(StudentResult::default()),
            Mode::Error => Err(AppError::upstream("result portal", "connection reset")),
            Mode::NotFound => Err(AppError::not_found(format!("no examinations for {period}"))),
        }
    }
}

#[async_trait]
impl ResultFetcher for FakeResults {
    async fn fetch_year(&self, hallticket: &str, _dob: Option<&str>, year: &str) -> Result<StudentResult> {
        self.year_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(hallticket, year).await
    }

    async fn fetch_exam(&self, query: &ExamQuery) -> Result<StudentResult> {
        self.exam_calls.fetch_add(1, Ordering::SeqCst);
        self.exam_queries.lock().unwrap().push(query.clone());
        self.respond(&query.hallticket, &query.exam_code).await
    }

    async fn fetch_all_periods(&self, hallticket: &str) -> Result<StudentResult> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        let mut result = self.respond(hallticket, "1-1").await?;
        if !result.is_empty() {
            result.merge_period("1-2", sample_result(hallticket, "1-2", "B+"));
        }
        Ok(result)
    }
}

fn exam_link(exam_code: &str, degree: &str, year: &str, supplementary: bool) -> ExamLink {
    ExamLink {
        title: format!("B.Tech exam {exam_code}"),
        degree: degree.to_string(),
        exam_code: exam_code.to_string(),
        etype: "r17".to_string(),
        result_type: "intgrade".to_string(),
        result: None,
        link: format!("http://portal.test/SearchResult.jsp?examCode={exam_code}"),
        date: "01-01-2024".to_string(),
        regulation: Some("R18".to_string()),
        year: Some(year.to_string()),
        supplementary,
    }
}

/// Listing fetcher with a call counter and a switchable mode.
pub struct FakeListings {
    mode: Mutex<Mode>,
    pub listing_calls: AtomicUsize,
    pub notification_calls: AtomicUsize,
}

impl FakeListings {
    pub fn new() -> Self {
        Self {
            mode: Mutex::new(Mode::Normal),
            listing_calls: AtomicUsize::new(0),
            notification_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn notification_calls(&self) -> usize {
        self.notification_calls.load(Ordering::SeqCst)
    }

    fn mode(&self) -> Mode {
        *self.mode.lock().unwrap()
    }
}

#[async_trait]
impl ListingFetcher for FakeListings {
    async fn fetch_listings(&self) -> Result<ListingSet> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            Mode::Normal => Ok(ListingSet::from_links(vec![
                exam_link("1662", "btech", "2-1", false),
                exam_link("1545", "btech", "1-2", true),
                exam_link("1500", "mba", "1-1", false),
            ])),
            Mode::Empty => Ok(ListingSet::default()),
            Mode::Error => Err(AppError::upstream("listing page", "timed out")),
            Mode::NotFound => Err(AppError::not_found("listing page")),
        }
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.notification_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            Mode::Normal => Ok(vec![Notification {
                title: "Revaluation schedule".to_string(),
                date: "05-05-2024".to_string(),
                link: "http://portal.test/docs/reval.pdf".to_string(),
            }]),
            Mode::Empty => Ok(Vec::new()),
            Mode::Error => Err(AppError::upstream("notifications page", "timed out")),
            Mode::NotFound => Err(AppError::not_found("notifications page")),
        }
    }
}

/// Cache backend that fails every call.
pub struct FailingCache {
    pub calls: AtomicUsize,
}

impl FailingCache {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CacheService for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Connection("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Connection("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Timeout("DEL".into()))
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Err(CacheError::Connection("connection refused".into()))
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// A router wired to fakes, with handles to inspect them.
pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    pub results: Arc<FakeResults>,
    pub listings: Arc<FakeListings>,
    pub cache: ResultCache,
}

impl TestApp {
    /// In-memory cache, instant fetchers.
    pub fn new() -> Self {
        Self::build(
            ResultCache::new(Arc::new(MokaCacheService::new(10_000))),
            FakeResults::new(),
        )
    }

    pub fn with_cache(cache: ResultCache) -> Self {
        Self::build(cache, FakeResults::new())
    }

    pub fn with_results(results: FakeResults) -> Self {
        Self::build(
            ResultCache::new(Arc::new(MokaCacheService::new(10_000))),
            results,
        )
    }

    fn build(cache: ResultCache, results: FakeResults) -> Self {
        let config = Arc::new(Config::default());
        let results = Arc::new(results);
        let listings = Arc::new(FakeListings::new());
        let state = Arc::new(AppState::new(
            config,
            cache.clone(),
            results.clone(),
            listings.clone(),
        ));
        Self {
            app: create_app(Arc::clone(&state)),
            state,
            results,
            listings,
            cache,
        }
    }

    /// Issue a GET and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// GET and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let value = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("body of {uri} is not JSON ({e}): {body}"));
        (status, value)
    }
}
