//! Bulk range handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::{optional, required};
use crate::error::Result;
use crate::models::{BulkRequest, DEFAULT_RESULT};
use crate::pipeline::BulkOutcome;
use crate::web::response::{raw_json, to_json};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkParams {
    pub hallticket_from: Option<String>,
    pub hallticket_to: Option<String>,
    pub degree: Option<String>,
    #[serde(rename = "examCode")]
    pub exam_code: Option<String>,
    pub etype: Option<String>,
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    pub result: Option<String>,
}

impl BulkParams {
    fn into_request(self, default_degree: &str) -> Result<BulkRequest> {
        Ok(BulkRequest {
            hallticket_from: required(self.hallticket_from, "hallticket_from")?.to_uppercase(),
            hallticket_to: required(self.hallticket_to, "hallticket_to")?.to_uppercase(),
            degree: optional(self.degree).unwrap_or_else(|| default_degree.to_string()),
            exam_code: required(self.exam_code, "examCode")?,
            etype: required(self.etype, "etype")?,
            result_type: required(self.result_type, "type")?,
            result: optional(self.result).unwrap_or_else(|| DEFAULT_RESULT.to_string()),
        })
    }
}

/// GET /api/bulk/calculate?hallticket_from&hallticket_to&degree&examCode&etype&type&result
///
/// Returns the cached array, an array assembled from per-hallticket
/// entries, or `{"result":"loading"}` while a worker fills the range.
pub async fn bulk_calculate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BulkParams>,
) -> Result<Response> {
    let request = params.into_request(&state.config.portal.default_degree)?;
    let body = match state.bulk.run(&request).await? {
        BulkOutcome::Cached(raw) | BulkOutcome::Pending(raw) => raw,
        BulkOutcome::Assembled(values) => to_json(&values)?,
    };
    Ok(raw_json(body))
}
