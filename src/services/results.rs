// src/services/results.rs

//! Result page scraper.
//!
//! A result page holds a details table (label/value pairs) followed by a
//! subject table whose header row starts with "Subject Code". Two subject
//! layouts exist:
//!
//! ```text
//! marks:  CODE | NAME | INTERNAL | EXTERNAL | TOTAL | GRADE | CREDITS
//! grades: CODE | NAME | GRADE | CREDITS
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, warn};

use super::{ListingFetcher, ResultFetcher};
use crate::error::{AppError, Result};
use crate::models::{
    Config, DEFAULT_RESULT, ExamLink, ExamQuery, SemesterResult, StudentDetails, StudentResult,
    SubjectGrade,
};
use crate::utils::http::fetch_text;
use crate::utils::{element_text, parse_selector};

/// reqwest + scraper implementation of [`ResultFetcher`].
///
/// Year and all-period lookups resolve exam codes through the listing.
pub struct ResultScraper {
    config: Arc<Config>,
    client: Client,
    listings: Arc<dyn ListingFetcher>,
}

impl ResultScraper {
    pub fn new(config: Arc<Config>, client: Client, listings: Arc<dyn ListingFetcher>) -> Self {
        Self {
            config,
            client,
            listings,
        }
    }

    /// Listing entries of the default degree matching `filter`, oldest first.
    async fn exam_links<F>(&self, filter: F) -> Result<Vec<ExamLink>>
    where
        F: Fn(&ExamLink) -> bool,
    {
        let degree = &self.config.portal.default_degree;
        let listing = self.listings.fetch_listings().await?;
        Ok(listing
            .unordered
            .into_iter()
            .rev()
            .filter(|link| link.degree.eq_ignore_ascii_case(degree) && filter(link))
            .collect())
    }

    fn query_for(link: &ExamLink, hallticket: &str, dob: Option<&str>) -> ExamQuery {
        ExamQuery {
            hallticket: hallticket.to_string(),
            dob: dob.map(str::to_string),
            degree: link.degree.clone(),
            exam_code: link.exam_code.clone(),
            etype: link.etype.clone(),
            result_type: link.result_type.clone(),
            result: link
                .result
                .clone()
                .unwrap_or_else(|| DEFAULT_RESULT.to_string()),
        }
    }
}

#[async_trait]
impl ResultFetcher for ResultScraper {
    async fn fetch_year(&self, hallticket: &str, dob: Option<&str>, year: &str) -> Result<StudentResult> {
        let links = self
            .exam_links(|link| link.year.as_deref() == Some(year))
            .await?;
        if links.is_empty() {
            return Err(AppError::not_found(format!("no examinations published for year {year}")));
        }

        let mut merged = StudentResult::default();
        let mut last_error = None;
        let mut fetched = 0usize;
        for link in &links {
            match self.fetch_exam(&Self::query_for(link, hallticket, dob)).await {
                Ok(result) => {
                    fetched += 1;
                    merged.merge_period(year, result);
                }
                Err(e) => {
                    warn!(hallticket, exam_code = %link.exam_code, error = %e, "Exam fetch failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if fetched == 0 => Err(e),
            _ => Ok(merged),
        }
    }

    async fn fetch_exam(&self, query: &ExamQuery) -> Result<StudentResult> {
        let portal = &self.config.portal;
        let mut url = portal.url(&portal.result_path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("degree", &query.degree)
                .append_pair("examCode", &query.exam_code)
                .append_pair("etype", &query.etype)
                .append_pair("type", &query.result_type)
                .append_pair("result", &query.result)
                .append_pair("htno", &query.hallticket);
            if let Some(dob) = &query.dob {
                pairs.append_pair("dob", dob);
            }
        }

        debug!(hallticket = %query.hallticket, exam_code = %query.exam_code, "Fetching result page");
        let html = fetch_text(&self.client, url).await?;
        parse_result_page(&html, &query.exam_code)
    }

    async fn fetch_all_periods(&self, hallticket: &str) -> Result<StudentResult> {
        let regulation = &self.config.portal.all_results_regulation;
        let links = self
            .exam_links(|link| {
                link.year.is_some() && link.regulation.as_deref() == Some(regulation.as_str())
            })
            .await?;

        let concurrency = self.config.portal.max_concurrent.max(1);
        let mut fetched: Vec<(usize, String, Result<StudentResult>)> = stream::iter(links.into_iter().enumerate())
            .map(|(index, link)| async move {
                let year = link.year.clone().unwrap_or_default();
                let result = self.fetch_exam(&Self::query_for(&link, hallticket, None)).await;
                (index, year, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        fetched.sort_by_key(|(index, _, _)| *index);

        let mut merged = StudentResult::default();
        let mut first_error = None;
        let mut successes = 0usize;
        for (_, year, result) in fetched {
            match result {
                Ok(result) => {
                    successes += 1;
                    merged.merge_period(&year, result);
                }
                Err(e) => {
                    warn!(hallticket, year = %year, error = %e, "Period fetch failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(hallticket, periods = merged.results.len(), "Fetched all periods");
        match first_error {
            Some(e) if successes == 0 => Err(e),
            _ => Ok(merged),
        }
    }
}

/// Parse one result page. Subjects land under `period`.
///
/// A page without a subject table (unknown hallticket, wrong date of
/// birth) yields an empty result.
pub fn parse_result_page(html: &str, period: &str) -> Result<StudentResult> {
    let document = Html::parse_document(html);
    let table_sel = parse_selector("table")?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("th, td")?;

    let mut result = StudentResult::default();
    let mut semester = SemesterResult::default();

    for table in document.select(&table_sel) {
        let rows: Vec<Vec<String>> = table
            .select(&row_sel)
            .map(|row| row.select(&cell_sel).map(|cell| element_text(&cell)).collect())
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();

        let is_subject_table = rows
            .first()
            .and_then(|header| header.first())
            .is_some_and(|first| first.eq_ignore_ascii_case("subject code"));

        if is_subject_table {
            for cells in rows.iter().skip(1) {
                if let Some((code, grade)) = parse_subject_row(cells) {
                    semester.subjects.insert(code, grade);
                }
            }
        } else {
            for cells in &rows {
                apply_details(&mut result.student_details, cells);
            }
        }
    }

    if !semester.subjects.is_empty() {
        result.results.insert(period.to_string(), semester);
    }
    Ok(result)
}

fn parse_subject_row(cells: &[String]) -> Option<(String, SubjectGrade)> {
    let credits = |text: &str| text.trim().parse::<f64>().unwrap_or(0.0);
    let optional = |text: &String| Some(text.clone()).filter(|t| !t.is_empty());

    let (code, grade) = match cells {
        [code, name, internal, external, total, grade, credit] => (
            code,
            SubjectGrade {
                subject_name: name.clone(),
                internal: optional(internal),
                external: optional(external),
                total: optional(total),
                grade: grade.clone(),
                credits: credits(credit),
            },
        ),
        [code, name, grade, credit] => (
            code,
            SubjectGrade {
                subject_name: name.clone(),
                grade: grade.clone(),
                credits: credits(credit),
                ..SubjectGrade::default()
            },
        ),
        _ => return None,
    };

    if code.is_empty() {
        return None;
    }
    Some((code.clone(), grade))
}

fn apply_details(details: &mut StudentDetails, cells: &[String]) {
    for pair in cells.chunks(2) {
        let [label, value] = pair else {
            continue;
        };
        let label = label.trim_end_matches(':').trim().to_lowercase();
        let slot = match label.as_str() {
            "hall ticket no" | "hallticket no" | "htno" => &mut details.hallticket,
            "name" | "student name" => &mut details.name,
            "father name" | "father's name" => &mut details.father_name,
            "college code" => &mut details.college_code,
            _ => continue,
        };
        if slot.is_empty() {
            *slot = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKS_PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>Hall Ticket No</th><td>18E51A0479</td><th>Name</th><td>RAVI KUMAR</td></tr>
          <tr><th>Father Name</th><td>SURESH KUMAR</td><th>College Code</th><td>E5</td></tr>
        </table>
        <table>
          <tr><th>SUBJECT CODE</th><th>SUBJECT NAME</th><th>INTERNAL</th><th>EXTERNAL</th><th>TOTAL</th><th>GRADE</th><th>CREDITS</th></tr>
          <tr><td>MA101BS</td><td>MATHEMATICS - I</td><td>21</td><td>48</td><td>69</td><td>A</td><td>4</td></tr>
          <tr><td>PH102BS</td><td>APPLIED PHYSICS</td><td>18</td><td>20</td><td>38</td><td>F</td><td>0</td></tr>
        </table>
        </body></html>
    "#;

    const GRADES_PAGE: &str = r#"
        <table>
          <tr><td>Hall Ticket No</td><td>18E51A0479</td><td>Name</td><td>RAVI KUMAR</td></tr>
        </table>
        <table>
          <tr><td>Subject Code</td><td>Subject Name</td><td>Grade</td><td>Credits</td></tr>
          <tr><td>CS201PC</td><td>DATA STRUCTURES</td><td>O</td><td>3</td></tr>
        </table>
    "#;

    #[test]
    fn test_parse_marks_layout() {
        let result = parse_result_page(MARKS_PAGE, "1-1").unwrap();

        assert_eq!(result.student_details.hallticket, "18E51A0479");
        assert_eq!(result.student_details.name, "RAVI KUMAR");
        assert_eq!(result.student_details.father_name, "SURESH KUMAR");
        assert_eq!(result.student_details.college_code, "E5");

        let period = &result.results["1-1"];
        assert_eq!(period.subjects.len(), 2);
        let maths = &period.subjects["MA101BS"];
        assert_eq!(maths.subject_name, "MATHEMATICS - I");
        assert_eq!(maths.internal.as_deref(), Some("21"));
        assert_eq!(maths.total.as_deref(), Some("69"));
        assert_eq!(maths.grade, "A");
        assert_eq!(maths.credits, 4.0);
        assert_eq!(period.subjects["PH102BS"].grade, "F");
    }

    #[test]
    fn test_parse_grades_layout() {
        let result = parse_result_page(GRADES_PAGE, "1454").unwrap();
        let subject = &result.results["1454"].subjects["CS201PC"];
        assert_eq!(subject.grade, "O");
        assert_eq!(subject.credits, 3.0);
        assert!(subject.internal.is_none());
    }

    #[test]
    fn test_page_without_subjects_is_empty() {
        let html = "<html><body><h3>Invalid Hall Ticket Number</h3></body></html>";
        let result = parse_result_page(html, "1-1").unwrap();
        assert!(result.is_empty());
        assert!(result.results.is_empty());
    }
}
