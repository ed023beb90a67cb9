//! Single-student result handlers.
//!
//! Every route follows the same composition: cache hit returns the stored
//! body byte-for-byte; a miss fetches, optionally adds SGPA, wraps the
//! result as `{"data": ...}` and stores it only when it is non-empty.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use super::{optional, required};
use crate::cache::keys;
use crate::error::Result;
use crate::models::{DEFAULT_RESULT, DataEnvelope, ExamQuery, StudentResult};
use crate::services::compute_metric;
use crate::web::response::{raw_json, to_json};
use crate::web::state::AppState;

/// Query form of the year lookup: `/result?hallticket&dob&year`.
#[derive(Debug, Deserialize)]
pub struct YearParams {
    pub hallticket: Option<String>,
    pub dob: Option<String>,
    pub year: Option<String>,
}

/// Portal parameters of one examination.
#[derive(Debug, Deserialize)]
pub struct ExamParams {
    pub hallticket: Option<String>,
    pub dob: Option<String>,
    pub degree: Option<String>,
    #[serde(rename = "examCode")]
    pub exam_code: Option<String>,
    pub etype: Option<String>,
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    pub result: Option<String>,
}

impl ExamParams {
    fn into_query(self, default_degree: &str) -> Result<ExamQuery> {
        Ok(ExamQuery {
            hallticket: required(self.hallticket, "hallticket")?.to_uppercase(),
            dob: optional(self.dob),
            degree: optional(self.degree).unwrap_or_else(|| default_degree.to_string()),
            exam_code: required(self.exam_code, "examCode")?,
            etype: required(self.etype, "etype")?,
            result_type: required(self.result_type, "type")?,
            result: optional(self.result).unwrap_or_else(|| DEFAULT_RESULT.to_string()),
        })
    }
}

async fn serve_result<F>(state: &AppState, key: String, ttl: Duration, calculate: bool, fetch: F) -> Result<Response>
where
    F: Future<Output = Result<StudentResult>>,
{
    if let Some(raw) = state.cache.get(&key).await {
        debug!(key = %key, "Result cache hit");
        return Ok(raw_json(raw));
    }

    let mut result = fetch.await?;
    if calculate {
        result = compute_metric(result);
    }

    let body = to_json(&DataEnvelope { data: &result })?;
    if result.is_empty() {
        debug!(key = %key, "Empty result, not caching");
    } else {
        state.cache.set(&key, &body, ttl).await;
    }
    Ok(raw_json(body))
}

async fn year_lookup(state: &AppState, hallticket: &str, dob: Option<String>, year: &str, calculate: bool) -> Result<Response> {
    let hallticket = hallticket.trim().to_uppercase();
    let dob = optional(dob);
    let year = year.trim();
    let dob_part = dob.as_deref().unwrap_or("");
    let key = if calculate {
        keys::calculated_result(&hallticket, dob_part, year)
    } else {
        keys::single_result(&hallticket, dob_part, year)
    };

    serve_result(
        state,
        key,
        state.config.ttl.result(),
        calculate,
        state.results.fetch_year(&hallticket, dob.as_deref(), year),
    )
    .await
}

/// GET /{hallticket}/{dob}/{year}
pub async fn year_result(
    State(state): State<Arc<AppState>>,
    Path((hallticket, dob, year)): Path<(String, String, String)>,
) -> Result<Response> {
    year_lookup(&state, &hallticket, Some(dob), &year, false).await
}

/// GET /calculate/{hallticket}/{dob}/{year}
pub async fn calculated_year_result(
    State(state): State<Arc<AppState>>,
    Path((hallticket, dob, year)): Path<(String, String, String)>,
) -> Result<Response> {
    year_lookup(&state, &hallticket, Some(dob), &year, true).await
}

/// GET /result?hallticket&dob&year
pub async fn year_result_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<YearParams>,
) -> Result<Response> {
    let hallticket = required(params.hallticket, "hallticket")?;
    let year = required(params.year, "year")?;
    year_lookup(&state, &hallticket, params.dob, &year, false).await
}

async fn exam_lookup(state: &AppState, params: ExamParams, calculate: bool) -> Result<Response> {
    let query = params.into_query(&state.config.portal.default_degree)?;
    serve_result(
        state,
        keys::exam_result(&query, calculate),
        state.config.ttl.result(),
        calculate,
        state.results.fetch_exam(&query),
    )
    .await
}

/// GET /api?hallticket&dob&degree&examCode&etype&type&result
pub async fn exam_result(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExamParams>,
) -> Result<Response> {
    exam_lookup(&state, params, false).await
}

/// GET /api/calculate?...
pub async fn calculated_exam_result(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExamParams>,
) -> Result<Response> {
    exam_lookup(&state, params, true).await
}

/// GET /all-r18/{hallticket}
///
/// Every period of the configured regulation with SGPA and overall GPA.
pub async fn all_results(
    State(state): State<Arc<AppState>>,
    Path(hallticket): Path<String>,
) -> Result<Response> {
    let hallticket = hallticket.trim().to_uppercase();
    let key = keys::all_results(&state.config.portal.all_results_regulation, &hallticket);
    serve_result(
        &state,
        key,
        state.config.ttl.all_results(),
        true,
        state.results.fetch_all_periods(&hallticket),
    )
    .await
}
