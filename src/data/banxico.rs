//! Banxico SIE REST adapter.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Observations, SeriesSource, parse_value};
use crate::error::AppError;

const BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1/series";
const TIMEOUT: Duration = Duration::from_secs(15);

pub struct BanxicoClient {
    client: Client,
    token: String,
}

impl BanxicoClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let token = std::env::var("BANXICO_TOKEN")
            .map_err(|_| AppError::Config("missing BANXICO_TOKEN in environment (.env)".to_string()))?;
        Self::new(token)
    }
}

impl SeriesSource for BanxicoClient {
    fn name(&self) -> &str {
        "banxico"
    }

    fn fetch(&self, series_id: &str, start: NaiveDate) -> Result<Observations, AppError> {
        let end = Local::now().date_naive();
        let url = format!("{BASE_URL}/{series_id}/datos/{start}/{end}");
        let resp = self
            .client
            .get(&url)
            .header("Bmx-Token", self.token.as_str())
            .send()
            .map_err(|e| AppError::fetch(series_id, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(
                series_id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body: BmxResponse = resp
            .json()
            .map_err(|e| AppError::fetch(series_id, format!("failed to parse response: {e}")))?;

        parse_response(series_id, body)
    }
}

#[derive(Debug, Deserialize)]
struct BmxResponse {
    bmx: Bmx,
}

#[derive(Debug, Deserialize)]
struct Bmx {
    series: Vec<BmxSeries>,
}

#[derive(Debug, Deserialize)]
struct BmxSeries {
    #[serde(default)]
    datos: Vec<Dato>,
}

#[derive(Debug, Deserialize)]
struct Dato {
    fecha: String,
    dato: String,
}

fn parse_response(series_id: &str, body: BmxResponse) -> Result<Observations, AppError> {
    let series = body
        .bmx
        .series
        .into_iter()
        .next()
        .ok_or_else(|| AppError::fetch(series_id, "response contains no series"))?;

    let mut out = Vec::with_capacity(series.datos.len());
    for dato in series.datos {
        let Some(value) = parse_value(&dato.dato) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&dato.fecha, "%d/%m/%Y")
            .map_err(|e| AppError::fetch(series_id, format!("invalid date '{}': {e}", dato.fecha)))?;
        out.push((date, value));
    }
    if out.is_empty() {
        return Err(AppError::fetch(series_id, "empty payload"));
    }
    Ok(out)
}
