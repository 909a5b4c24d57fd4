//! Environment configuration for the REST data sources.
//!
//! Values come from the process environment, optionally seeded from `.env`.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_DISEASE_API_URL: &str = "https://disease.sh/v3/covid-19";
pub const DEFAULT_COUNTRIES_API_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HISTORY_DAYS: &str = "1500";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub disease_url: String,
    pub countries_url: String,
    pub timeout: Duration,
    /// `lastdays` query value: a day count or `all`.
    pub history_days: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            disease_url: DEFAULT_DISEASE_API_URL.to_string(),
            countries_url: DEFAULT_COUNTRIES_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            history_days: DEFAULT_HISTORY_DAYS.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (unset or blank means default).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout = match get("API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| AppError::new(2, format!("Invalid API_TIMEOUT_SECS '{raw}' (expected seconds).")))?;
                if secs == 0 {
                    return Err(AppError::new(2, "API_TIMEOUT_SECS must be > 0."));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let history_days = match get("HISTORY_DAYS") {
            Some(raw) if raw.eq_ignore_ascii_case("all") => "all".to_string(),
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n.to_string(),
                _ => {
                    return Err(AppError::new(
                        2,
                        format!("Invalid HISTORY_DAYS '{raw}' (expected a positive day count or 'all')."),
                    ));
                }
            },
            None => defaults.history_days,
        };

        Ok(Self {
            disease_url: get("DISEASE_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.disease_url),
            countries_url: get("COUNTRIES_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.countries_url),
            timeout,
            history_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DISEASE_API_URL", "http://localhost:8080/v3/covid-19/"),
            ("API_TIMEOUT_SECS", "3"),
            ("HISTORY_DAYS", "ALL"),
            ("COUNTRIES_API_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.disease_url, "http://localhost:8080/v3/covid-19");
        assert_eq!(config.countries_url, DEFAULT_COUNTRIES_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.history_days, "all");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for vars in [
            [("API_TIMEOUT_SECS", "soon")],
            [("API_TIMEOUT_SECS", "0")],
            [("HISTORY_DAYS", "-5")],
        ] {
            let err = ApiConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }
}
