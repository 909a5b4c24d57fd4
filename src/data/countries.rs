//! restcountries API integration: names, codes and population.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::data::http::get_json;
use crate::domain::CountryMeta;
use crate::error::AppError;

/// Only the fields the dashboard uses; `/all` requires an explicit field list.
const ALL_FIELDS: &str = "name,cca3,population";

#[derive(Debug, Deserialize)]
struct CountryRecord {
    name: CountryName,
    cca3: String,
    #[serde(default)]
    population: u64,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
    #[serde(default)]
    official: String,
}

impl From<CountryRecord> for CountryMeta {
    fn from(record: CountryRecord) -> Self {
        let official_name = if record.name.official.is_empty() {
            record.name.common.clone()
        } else {
            record.name.official
        };
        CountryMeta {
            name: record.name.common,
            official_name,
            code: record.cca3,
            population: record.population,
        }
    }
}

/// `/alpha/{code}` answers with a list, older mirrors with a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CountryRecord>),
    One(CountryRecord),
}

#[derive(Clone)]
pub struct CountriesClient {
    client: Client,
    base_url: String,
}

impl CountriesClient {
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.countries_url.clone(),
        }
    }

    /// Look up one country by its alpha-2/alpha-3 code. `Ok(None)` when unknown.
    pub fn fetch_country(&self, code: &str) -> Result<Option<CountryMeta>, AppError> {
        let url = format!("{}/alpha/{}", self.base_url, code.trim());
        let body: Option<OneOrMany> = get_json(&self.client, &url, "country metadata")?;
        Ok(body.and_then(|b| match b {
            OneOrMany::Many(records) => records.into_iter().next().map(CountryMeta::from),
            OneOrMany::One(record) => Some(record.into()),
        }))
    }

    /// Every country, sorted by common name.
    pub fn fetch_all(&self) -> Result<Vec<CountryMeta>, AppError> {
        let url = format!("{}/all?fields={ALL_FIELDS}", self.base_url);
        let records: Vec<CountryRecord> = get_json(&self.client, &url, "country list")?
            .ok_or_else(|| AppError::new(4, "Failed to load countries. Please try again."))?;
        Ok(sort_countries(records.into_iter().map(CountryMeta::from).collect()))
    }
}

pub fn sort_countries(mut countries: Vec<CountryMeta>) -> Vec<CountryMeta> {
    countries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.code.cmp(&b.code))
    });
    countries
}

/// Case-insensitive substring match on the common name (or exact code match).
pub fn search_countries<'a>(countries: &'a [CountryMeta], term: &str) -> Vec<&'a CountryMeta> {
    let needle = term.trim().to_lowercase();
    countries
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.code.eq_ignore_ascii_case(&needle)
        })
        .collect()
}
