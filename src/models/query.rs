//! Request parameter bundles passed to the fetchers.

use serde::{Deserialize, Serialize};

/// Value the portal expects when no `result` filter applies.
pub const DEFAULT_RESULT: &str = "null";

/// Parameters identifying one exam result on the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuery {
    pub hallticket: String,
    pub dob: Option<String>,
    pub degree: String,
    pub exam_code: String,
    pub etype: String,
    pub result_type: String,
    pub result: String,
}

/// Parameters of a bulk range fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub hallticket_from: String,
    pub hallticket_to: String,
    pub degree: String,
    pub exam_code: String,
    pub etype: String,
    pub result_type: String,
    pub result: String,
}

impl BulkRequest {
    /// The per-hallticket query the worker issues.
    pub fn exam_query(&self, hallticket: &str) -> ExamQuery {
        ExamQuery {
            hallticket: hallticket.to_string(),
            dob: None,
            degree: self.degree.clone(),
            exam_code: self.exam_code.clone(),
            etype: self.etype.clone(),
            result_type: self.result_type.clone(),
            result: self.result.clone(),
        }
    }
}
