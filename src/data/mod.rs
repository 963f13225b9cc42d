//! Series providers and monthly alignment.
//!
//! A `SeriesSource` returns raw `(date, value)` observations for one series id.
//! Country presets know which three ids to request and how the inflation
//! series is delivered; `align` turns the raw observations into an
//! `AlignedSeries`.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{Country, InflationInput, month_start};
use crate::error::AppError;

pub mod align;
pub mod banxico;
pub mod fred;
pub mod sample;

pub use align::{MIN_OBSERVATIONS, align_monthly};
pub use banxico::BanxicoClient;
pub use fred::FredClient;

pub type Observations = Vec<(NaiveDate, f64)>;

/// A remote (or in-memory) provider of date-indexed series.
pub trait SeriesSource {
    /// Stable identifier used in cache keys and log lines.
    fn name(&self) -> &str;

    /// Observations of `series_id` from `start` through the present.
    fn fetch(&self, series_id: &str, start: NaiveDate) -> Result<Observations, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesIds {
    pub inflation: &'static str,
    pub policy_rate: &'static str,
    pub exchange_rate: &'static str,
}

const MEXICO_START: NaiveDate = month_start(2002, 1);
const USA_START: NaiveDate = month_start(2005, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryPreset {
    pub country: Country,
    pub series: SeriesIds,
    pub inflation_input: InflationInput,
    pub default_start: NaiveDate,
}

impl CountryPreset {
    pub fn for_country(country: Country) -> Self {
        match country {
            Country::Mexico => Self {
                country,
                series: SeriesIds {
                    inflation: "SP30578",
                    policy_rate: "SF43783",
                    exchange_rate: "SF43718",
                },
                inflation_input: InflationInput::AnnualRate,
                default_start: MEXICO_START,
            },
            Country::Usa => Self {
                country,
                series: SeriesIds {
                    inflation: "CPIAUCSL",
                    policy_rate: "EFFR",
                    exchange_rate: "DTWEXAFEGS",
                },
                inflation_input: InflationInput::PriceIndex,
                default_start: USA_START,
            },
        }
    }
}

/// The three raw series of one run, before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub inflation: Observations,
    pub policy_rate: Observations,
    pub exchange_rate: Observations,
}

/// Fetch all three series of `preset`; any failure aborts the whole run.
pub fn fetch_raw(
    source: &dyn SeriesSource,
    preset: &CountryPreset,
    start: NaiveDate,
) -> Result<RawSeries, AppError> {
    let ids = preset.series;
    let fetch = |id: &str| -> Result<Observations, AppError> {
        let obs = source.fetch(id, start)?;
        if obs.is_empty() {
            return Err(AppError::fetch(id, "no observations returned"));
        }
        info!(source = source.name(), series = id, count = obs.len(), "fetched series");
        Ok(obs)
    };

    Ok(RawSeries {
        inflation: fetch(ids.inflation)?,
        policy_rate: fetch(ids.policy_rate)?,
        exchange_rate: fetch(ids.exchange_rate)?,
    })
}

/// Parse a provider value, treating blanks and missing-value markers as absent.
pub(crate) fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if matches!(trimmed, "" | "." | "N/E") {
        return None;
    }
    let v = trimmed.replace(',', "").parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
