//! FRED `series/observations` adapter.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Observations, SeriesSource, parse_value};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const TIMEOUT: Duration = Duration::from_secs(15);

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::Config("missing FRED_API_KEY in environment (.env)".to_string()))?;
        Self::new(api_key)
    }
}

impl SeriesSource for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series_id: &str, start: NaiveDate) -> Result<Observations, AppError> {
        let start = start.to_string();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .map_err(|e| AppError::fetch(series_id, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(
                series_id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::fetch(series_id, format!("failed to parse response: {e}")))?;

        parse_observations(series_id, body)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(series_id: &str, body: ObservationsResponse) -> Result<Observations, AppError> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| AppError::fetch(series_id, format!("invalid date '{}': {e}", obs.date)))?;
        out.push((date, value));
    }
    if out.is_empty() {
        return Err(AppError::fetch(series_id, "empty payload"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_skip_missing_dots() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[
                {"date":"2024-01-01","value":"5.33"},
                {"date":"2024-01-02","value":"."},
                {"date":"2024-01-03","value":"5.31"}
            ]}"#,
        )
        .unwrap();
        let obs = parse_observations("EFFR", body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1], (NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 5.31));
    }

    #[test]
    fn all_missing_is_an_empty_payload() {
        let body: ObservationsResponse =
            serde_json::from_str(r#"{"observations":[{"date":"2024-01-01","value":"."}]}"#).unwrap();
        let err = parse_observations("EFFR", body).unwrap_err();
        assert!(err.to_string().contains("empty payload"));
    }
}
