//! REST data sources (disease.sh timelines, restcountries metadata).

pub mod countries;
pub mod disease;
pub mod http;

pub use countries::{CountriesClient, search_countries, sort_countries};
pub use disease::{CountrySummary, DiseaseClient, HistoricalPayload, read_historical_file};

use crate::config::ApiConfig;
use crate::error::AppError;

/// Both API clients, sharing one connection pool.
#[derive(Clone)]
pub struct DataSources {
    pub disease: DiseaseClient,
    pub countries: CountriesClient,
}

impl DataSources {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = http::build_client(config)?;
        Ok(Self {
            disease: DiseaseClient::with_client(client.clone(), config),
            countries: CountriesClient::with_client(client, config),
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::new(&ApiConfig::from_env()?)
    }
}
