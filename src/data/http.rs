//! Blocking HTTP plumbing shared by the API clients.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::AppError;

pub fn build_client(config: &ApiConfig) -> Result<Client, AppError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))
}

/// GET `url` and decode JSON. A 404 is `Ok(None)`; the caller decides what "not found" means.
pub fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    what: &str,
) -> Result<Option<T>, AppError> {
    tracing::debug!(%url, "fetching {what}");

    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .map_err(|e| {
            if e.is_timeout() {
                AppError::new(4, format!("Request timed out while fetching {what}. Please check your internet connection."))
            } else {
                AppError::new(4, format!("Request for {what} failed: {e}"))
            }
        })?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        tracing::info!(%url, "{what} not found");
        return Ok(None);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::new(4, "Too many requests. Please try again later."));
    }
    if !status.is_success() {
        return Err(AppError::new(
            4,
            format!("Request for {what} failed with status {status}."),
        ));
    }

    let body = resp
        .json::<T>()
        .map_err(|e| AppError::new(4, format!("Failed to parse {what} response: {e}")))?;
    Ok(Some(body))
}
