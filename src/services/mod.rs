//! Service layer for the result server.
//!
//! This module contains the collaborators the HTTP handlers depend on:
//! - Result fetching (`ResultFetcher`, implemented by `ResultScraper`)
//! - Listing fetching (`ListingFetcher`, implemented by `ListingScraper`)
//! - SGPA computation (`sgpa::compute_metric`)
//!
//! The fetchers sit behind object-safe traits so handlers take
//! `Arc<dyn ...>` and tests can substitute fakes.

mod listings;
mod results;
pub mod sgpa;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ExamQuery, ListingSet, Notification, StudentResult};

pub use listings::{ListingScraper, parse_listing_page, parse_notifications};
pub use results::{ResultScraper, parse_result_page};
pub use sgpa::compute_metric;

/// Fetches student results from the portal.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Results of every exam period of `year` (e.g. `"2-1"`), merged.
    async fn fetch_year(&self, hallticket: &str, dob: Option<&str>, year: &str) -> Result<StudentResult>;

    /// Result of one examination identified by its portal parameters.
    async fn fetch_exam(&self, query: &ExamQuery) -> Result<StudentResult>;

    /// Every period of the configured regulation, grouped by year.
    async fn fetch_all_periods(&self, hallticket: &str) -> Result<StudentResult>;
}

/// Fetches the portal's exam listing and notifications.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    async fn fetch_listings(&self) -> Result<ListingSet>;

    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;
}
