// src/services/listings.rs

//! Exam listing and notification scraper.
//!
//! The listing page is a table of links, one per published examination.
//! Each link carries the portal parameters (`degree`, `examCode`, `etype`,
//! `type`, `result`) needed to request an individual result.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use super::ListingFetcher;
use crate::error::Result;
use crate::models::{Config, ExamLink, ListingSet, Notification, PortalSelectors};
use crate::utils::http::fetch_text;
use crate::utils::{element_text, parse_selector, resolve_url};

/// reqwest + scraper implementation of [`ListingFetcher`].
pub struct ListingScraper {
    config: Arc<Config>,
    client: Client,
}

impl ListingScraper {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl ListingFetcher for ListingScraper {
    async fn fetch_listings(&self) -> Result<ListingSet> {
        let portal = &self.config.portal;
        let url = portal.url(&portal.listing_path)?;
        let html = fetch_text(&self.client, url.clone()).await?;

        let links = parse_listing_page(&html, &url, &portal.selectors)?;
        info!(count = links.len(), "Fetched exam listing");
        Ok(ListingSet::from_links(links))
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        let portal = &self.config.portal;
        let url = portal.url(&portal.notifications_path)?;
        let html = fetch_text(&self.client, url.clone()).await?;

        let notifications = parse_notifications(&html, &url, &portal.selectors)?;
        info!(count = notifications.len(), "Fetched notifications");
        Ok(notifications)
    }
}

/// Parse the listing page into exam links, in page order.
///
/// Rows without a link carrying an `examCode` are skipped.
pub fn parse_listing_page(html: &str, base: &Url, selectors: &PortalSelectors) -> Result<Vec<ExamLink>> {
    let document = Html::parse_document(html);
    let row_sel = parse_selector(&selectors.listing_row)?;
    let link_sel = parse_selector(&selectors.listing_link)?;
    let date_sel = parse_selector(&selectors.listing_date)?;

    let mut links = Vec::new();
    for row in document.select(&row_sel) {
        let Some(anchor) = row.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let link = resolve_url(base, href);
        let Ok(parsed) = Url::parse(&link) else {
            debug!(href, "Skipping unparseable listing link");
            continue;
        };

        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };
        let Some(exam_code) = param("examCode") else {
            continue;
        };

        let title = element_text(&anchor);
        let date = row
            .select(&date_sel)
            .next()
            .map(|cell| element_text(&cell))
            .filter(|text| *text != title)
            .unwrap_or_default();

        links.push(ExamLink {
            regulation: parse_regulation(&title),
            year: parse_year(&title),
            supplementary: is_supplementary(&title),
            degree: param("degree").unwrap_or_default(),
            exam_code,
            etype: param("etype").unwrap_or_default(),
            result_type: param("type").unwrap_or_default(),
            result: param("result"),
            title,
            link,
            date,
        });
    }
    Ok(links)
}

/// Parse the notifications page.
pub fn parse_notifications(html: &str, base: &Url, selectors: &PortalSelectors) -> Result<Vec<Notification>> {
    let document = Html::parse_document(html);
    let row_sel = parse_selector(&selectors.notification_row)?;
    let link_sel = parse_selector(&selectors.notification_link)?;
    let date_sel = parse_selector(&selectors.notification_date)?;

    let notifications = document
        .select(&row_sel)
        .filter_map(|row| {
            let anchor = row.select(&link_sel).next()?;
            let title = element_text(&anchor);
            if title.is_empty() {
                return None;
            }
            let link = anchor
                .value()
                .attr("href")
                .map(|href| resolve_url(base, href))
                .unwrap_or_default();
            let date = row
                .select(&date_sel)
                .next()
                .map(|cell| element_text(&cell))
                .filter(|text| *text != title)
                .unwrap_or_default();
            Some(Notification { title, date, link })
        })
        .collect();
    Ok(notifications)
}

/// Regulation code such as `R18`.
fn parse_regulation(title: &str) -> Option<String> {
    let re = Regex::new(r"\b(R\d{2})\b").ok()?;
    re.captures(title).map(|caps| caps[1].to_string())
}

/// `"II Year I Semester"` becomes `"2-1"`.
fn parse_year(title: &str) -> Option<String> {
    let re = Regex::new(r"(?i)\b(IV|III|II|I)\s+Year\s+(II|I)\s+Sem").ok()?;
    let caps = re.captures(title)?;
    Some(format!("{}-{}", roman(&caps[1])?, roman(&caps[2])?))
}

fn roman(numeral: &str) -> Option<u8> {
    match numeral.to_ascii_uppercase().as_str() {
        "I" => Some(1),
        "II" => Some(2),
        "III" => Some(3),
        "IV" => Some(4),
        _ => None,
    }
}

fn is_supplementary(title: &str) -> bool {
    title.to_lowercase().contains("supple")
}
