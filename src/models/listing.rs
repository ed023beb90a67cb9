//! Exam listing and notification structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published examination on the portal's listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExamLink {
    /// Link text, e.g. "B.Tech II Year I Semester (R18) Regular Examinations"
    pub title: String,
    pub degree: String,
    pub exam_code: String,
    pub etype: String,
    pub result_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Absolute URL of the result search page
    pub link: String,
    /// Publication date as printed
    pub date: String,
    /// Regulation parsed from the title, e.g. "R18"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
    /// Year and semester parsed from the title, e.g. "2-1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub supplementary: bool,
}

/// Exam links grouped by degree.
pub type ExamsByDegree = BTreeMap<String, Vec<ExamLink>>;

/// The four views of one listing page scrape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingSet {
    pub all: ExamsByDegree,
    pub regular: ExamsByDegree,
    pub supply: ExamsByDegree,
    /// Exam links in page order
    pub unordered: Vec<ExamLink>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ListingSet {
    /// Build every view from the links in page order.
    pub fn from_links(links: Vec<ExamLink>) -> Self {
        let mut set = Self {
            fetched_at: Some(Utc::now()),
            ..Self::default()
        };

        for link in &links {
            set.all
                .entry(link.degree.clone())
                .or_default()
                .push(link.clone());

            let bucket = if link.supplementary {
                &mut set.supply
            } else {
                &mut set.regular
            };
            bucket
                .entry(link.degree.clone())
                .or_default()
                .push(link.clone());
        }

        set.unordered = links;
        set
    }

    pub fn is_empty(&self) -> bool {
        self.unordered.is_empty()
    }
}

/// A notification posted on the portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub date: String,
    pub link: String,
}
