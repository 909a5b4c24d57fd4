//! disease.sh API integration: historical timelines and country summaries.

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::data::http::get_json;
use crate::domain::RawTimeline;
use crate::error::AppError;

/// Historical payload for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPayload {
    /// Country name as reported by disease.sh (absent for the global timeline).
    #[serde(default)]
    pub country: Option<String>,
    pub timeline: RawTimeline,
}

/// `/historical/{code}` returns a wrapped timeline; `/historical/all` a bare one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoricalBody {
    Country(HistoricalPayload),
    Global(RawTimeline),
}

impl From<HistoricalBody> for HistoricalPayload {
    fn from(body: HistoricalBody) -> Self {
        match body {
            HistoricalBody::Country(payload) => payload,
            HistoricalBody::Global(timeline) => HistoricalPayload {
                country: None,
                timeline,
            },
        }
    }
}

/// Country summary from `/countries/{code}`; only the population is used
/// (fallback when restcountries has no record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub country: String,
    #[serde(default)]
    pub population: u64,
}

#[derive(Clone)]
pub struct DiseaseClient {
    client: Client,
    base_url: String,
    history_days: String,
}

impl DiseaseClient {
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.disease_url.clone(),
            history_days: config.history_days.clone(),
        }
    }

    /// Historical cumulative counts. `Ok(None)` when the country is unknown.
    pub fn fetch_timeline(&self, country_code: &str) -> Result<Option<HistoricalPayload>, AppError> {
        let url = format!(
            "{}/historical/{}?lastdays={}",
            self.base_url,
            encode_segment(country_code),
            self.history_days
        );
        let body: Option<HistoricalBody> = get_json(&self.client, &url, "historical timeline")?;
        Ok(body.map(HistoricalPayload::from))
    }

    /// Current totals (used as a population fallback).
    pub fn fetch_summary(&self, country_code: &str) -> Result<Option<CountrySummary>, AppError> {
        let url = format!("{}/countries/{}", self.base_url, encode_segment(country_code));
        get_json(&self.client, &url, "country summary")
    }
}

/// Read a saved historical payload (offline mode).
pub fn read_historical_file(path: &Path) -> Result<HistoricalPayload, AppError> {
    let json = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open timeline file '{}': {e}", path.display()),
        )
    })?;
    decode_historical(&json)
        .map_err(|e| AppError::new(2, format!("Invalid timeline file '{}': {e}", path.display())))
}

/// A historical payload is either country-wrapped or a bare timeline.
fn decode_historical(json: &str) -> Result<HistoricalPayload, serde_json::Error> {
    serde_json::from_str::<HistoricalBody>(json).map(HistoricalPayload::from)
}

/// Country codes/names go into a URL path segment.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.trim().bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
