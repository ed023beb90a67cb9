//! Deterministic cache keys.
//!
//! A key is a namespace followed by percent-encoded components joined with
//! `:`. Encoding escapes `:` inside a component, so two different parameter
//! tuples can never produce the same key.

use url::form_urlencoded::byte_serialize;

use crate::models::{BulkRequest, ExamQuery};

pub const ALL_EXAMS: &str = "all_exams";
pub const ALL_REGULAR: &str = "all_regular";
pub const ALL_SUPPLY: &str = "all_supply";
pub const ALL_UNORDERED: &str = "all_unordered";
pub const NOTIFICATIONS: &str = "notifications";

fn build(namespace: &str, parts: &[&str]) -> String {
    let mut key = String::from(namespace);
    for part in parts {
        key.push(':');
        key.extend(byte_serialize(part.as_bytes()));
    }
    key
}

/// `/{hallticket}/{dob}/{year}` and `/result`.
pub fn single_result(hallticket: &str, dob: &str, year: &str) -> String {
    build("result", &[hallticket, dob, year])
}

/// `/calculate/{hallticket}/{dob}/{year}`.
pub fn calculated_result(hallticket: &str, dob: &str, year: &str) -> String {
    build("calculate", &[hallticket, dob, year])
}

/// `/api` and `/api/calculate`.
pub fn exam_result(query: &ExamQuery, calculated: bool) -> String {
    let namespace = if calculated { "api-calculate" } else { "api" };
    let dob = query.dob.as_deref().unwrap_or("");
    build(
        namespace,
        &[
            &query.hallticket,
            dob,
            &query.degree,
            &query.exam_code,
            &query.etype,
            &query.result_type,
            &query.result,
        ],
    )
}

/// Aggregate entry for a bulk range request.
pub fn bulk_range(request: &BulkRequest) -> String {
    build(
        "bulk",
        &[
            &request.hallticket_from.to_uppercase(),
            &request.hallticket_to.to_uppercase(),
            &request.degree,
            &request.exam_code,
            &request.etype,
            &request.result_type,
            &request.result,
        ],
    )
}

/// Per-hallticket entry of a bulk range.
///
/// Bulk queries carry no dob, so this is the `/api/calculate` slot of the
/// same query: single lookups feed the bulk fast path and bulk workers
/// feed single lookups.
pub fn bulk_item(query: &ExamQuery) -> String {
    exam_result(query, true)
}

/// All periods of one regulation, e.g. `all-r18:<hallticket>`.
pub fn all_results(regulation: &str, hallticket: &str) -> String {
    build(
        &format!("all-{}", regulation.to_lowercase()),
        &[&hallticket.to_uppercase()],
    )
}
