// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::PortalConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &PortalConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET a page and return its body. A non-2xx answer from the portal is an
/// upstream error; transport failures stay `AppError::Http`.
pub async fn fetch_text(client: &reqwest::Client, url: Url) -> Result<String> {
    let response = client.get(url.clone()).send().await?;
    check_status(&url, response.status())?;
    Ok(response.text().await?)
}

fn check_status(url: &Url, status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AppError::upstream(url.path(), format!("portal answered {status}")))
    }
}
