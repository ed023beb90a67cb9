//! Student result data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity block printed above every result table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentDetails {
    pub name: String,
    pub hallticket: String,
    pub father_name: String,
    pub college_code: String,
}

impl StudentDetails {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.hallticket.is_empty()
    }
}

/// One subject row of a result table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubjectGrade {
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    pub grade: String,
    pub credits: f64,
}

/// All subjects of one exam period plus its SGPA once computed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SemesterResult {
    /// Subject code to grade row
    pub subjects: BTreeMap<String, SubjectGrade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sgpa: Option<f64>,
}

/// A student's results keyed by year or exam period.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentResult {
    pub student_details: StudentDetails,

    /// Period label (`"1-1"`, exam code, ...) to its subjects
    pub results: BTreeMap<String, SemesterResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_gpa: Option<f64>,
}

impl StudentResult {
    /// True when no period carries a single subject.
    pub fn is_empty(&self) -> bool {
        self.results.values().all(|period| period.subjects.is_empty())
    }

    /// Fold another scrape into `period`.
    ///
    /// A failing grade never replaces a passing one, so merging regular and
    /// supplementary sittings keeps the grade the student finally earned.
    pub fn merge_period(&mut self, period: &str, other: StudentResult) {
        if self.student_details.is_empty() {
            self.student_details = other.student_details;
        }

        let target = self.results.entry(period.to_string()).or_default();
        for semester in other.results.into_values() {
            for (code, grade) in semester.subjects {
                let keep_existing = target
                    .subjects
                    .get(&code)
                    .is_some_and(|existing| is_passing(&existing.grade) && !is_passing(&grade.grade));
                if !keep_existing {
                    target.subjects.insert(code, grade);
                }
            }
        }

        if target.subjects.is_empty() {
            self.results.remove(period);
        }
    }
}

/// Whether a letter grade counts as passed.
pub fn is_passing(grade: &str) -> bool {
    !matches!(
        grade.trim().to_ascii_uppercase().as_str(),
        "F" | "AB" | "ABSENT" | "" | "-"
    )
}

/// `{"data": ...}` body of single-result responses and their cache entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEnvelope<T> {
    pub data: T,
}
