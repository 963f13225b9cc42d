//! Shared domain types.
//!
//! These types are intentionally kept small so they can be:
//!
//! - passed between pipeline stages without copying large tables
//! - exported to CSV/JSON
//! - constructed directly in tests

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Inclusive range accepted for the projection horizon (years).
pub const MIN_YEARS_TO_PROJECT: u32 = 5;
pub const MAX_YEARS_TO_PROJECT: u32 = 50;

/// One of the three fixed columns of an aligned series.
///
/// Column order is fixed everywhere: inflation first, so residual and forecast
/// column 0 always refer to the inflation equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Inflation,
    PolicyRate,
    FxLog,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Inflation, Variable::PolicyRate, Variable::FxLog];

    /// Variables tested for unit roots (inflation is always modelled in levels).
    pub const AUXILIARY: [Variable; 2] = [Variable::PolicyRate, Variable::FxLog];

    pub fn name(self) -> &'static str {
        match self {
            Variable::Inflation => "inflation",
            Variable::PolicyRate => "policy_rate",
            Variable::FxLog => "fx_log",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Variable::Inflation => 0,
            Variable::PolicyRate => 1,
            Variable::FxLog => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First day of `month` in `year`, for date constants.
///
/// An invalid date fails const evaluation instead of producing a fallback.
pub const fn month_start(year: i32, month: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date,
        None => panic!("invalid month start"),
    }
}

/// Return the first day of the month `months` after `date`'s month.
pub fn month_start_after(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(months))
}

/// Date-indexed monthly table with exactly the three `Variable` columns.
///
/// Invariants (checked on construction):
/// - at least one row, every value finite
/// - dates are month starts, strictly increasing by exactly one month
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    dates: Vec<NaiveDate>,
    values: DMatrix<f64>,
}

impl AlignedSeries {
    pub fn new(dates: Vec<NaiveDate>, values: DMatrix<f64>) -> Result<Self, AppError> {
        if dates.is_empty() {
            return Err(AppError::DataAlignment("aligned series is empty".to_string()));
        }
        if values.ncols() != Variable::ALL.len() || values.nrows() != dates.len() {
            return Err(AppError::DataAlignment(format!(
                "expected {} x {} values, got {} x {}",
                dates.len(),
                Variable::ALL.len(),
                values.nrows(),
                values.ncols()
            )));
        }
        if let Some(bad) = dates.iter().find(|d| d.day() != 1) {
            return Err(AppError::DataAlignment(format!("date {bad} is not a month start")));
        }
        for pair in dates.windows(2) {
            if month_start_after(pair[0], 1) != Some(pair[1]) {
                return Err(AppError::DataAlignment(format!(
                    "non-uniform monthly step between {} and {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some((row, col)) = find_non_finite(&values) {
            return Err(AppError::DataAlignment(format!(
                "non-finite {} value at {}",
                Variable::ALL[col],
                dates[row]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Build from `(date, [inflation, policy_rate, fx_log])` rows.
    pub fn from_rows(rows: &[(NaiveDate, [f64; 3])]) -> Result<Self, AppError> {
        let dates = rows.iter().map(|(d, _)| *d).collect();
        let values = DMatrix::from_fn(rows.len(), 3, |r, c| rows[r].1[c]);
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// `T x 3` value matrix in `Variable::ALL` column order.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn column(&self, var: Variable) -> Vec<f64> {
        self.values.column(var.index()).iter().copied().collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn last_value(&self, var: Variable) -> f64 {
        self.values[(self.values.nrows() - 1, var.index())]
    }
}

fn find_non_finite(values: &DMatrix<f64>) -> Option<(usize, usize)> {
    for c in 0..values.ncols() {
        for r in 0..values.nrows() {
            if !values[(r, c)].is_finite() {
                return Some((r, c));
            }
        }
    }
    None
}

/// Country presets supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[value(alias = "mx")]
    Mexico,
    #[value(alias = "us")]
    Usa,
}

impl Country {
    pub fn display_name(self) -> &'static str {
        match self {
            Country::Mexico => "Mexico",
            Country::Usa => "United States",
        }
    }
}

/// How the provider delivers the inflation series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationInput {
    /// Already an annual inflation rate in percent.
    AnnualRate,
    /// A price index; converted to year-on-year percent change.
    PriceIndex,
}

/// Which estimator the selector chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// VAR on the working table (non-stationary auxiliaries first-differenced).
    #[serde(rename = "VAR")]
    VarDifferenced,
    /// Vector error-correction model on levels.
    #[serde(rename = "VECM")]
    Vecm,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::VarDifferenced => "VAR",
            ModelKind::Vecm => "VECM",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The three narrative scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Built from the point forecast.
    Base,
    /// Built from the lower 95% bound.
    Positive,
    /// Built from the upper 95% bound.
    Negative,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [ScenarioKind::Base, ScenarioKind::Positive, ScenarioKind::Negative];

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioKind::Base => "Base",
            ScenarioKind::Positive => "Positive",
            ScenarioKind::Negative => "Negative",
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            ScenarioKind::Base => "base",
            ScenarioKind::Positive => "positive",
            ScenarioKind::Negative => "negative",
        }
    }
}

/// Scenario construction parameters.
///
/// `years_model` is the length of the statistical-forecast segment; after it,
/// each path reverts toward its target at its own speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub years_model: u32,
    pub target_central: f64,
    pub target_low: f64,
    pub target_high: f64,
    pub theta_central: f64,
    pub theta_low: f64,
    pub theta_high: f64,
}

impl ScenarioParams {
    pub fn for_country(country: Country) -> Self {
        match country {
            Country::Mexico => Self {
                years_model: 5,
                target_central: 3.0,
                target_low: 3.0,
                target_high: 5.5,
                theta_central: 0.030,
                theta_low: 0.015,
                theta_high: 0.050,
            },
            Country::Usa => Self {
                years_model: 5,
                target_central: 2.0,
                target_low: 2.0,
                target_high: 3.5,
                theta_central: 0.030,
                theta_low: 0.050,
                theta_high: 0.015,
            },
        }
    }

    /// `(theta, target)` pair driving the convergence phase of `kind`.
    pub fn rule(&self, kind: ScenarioKind) -> (f64, f64) {
        match kind {
            ScenarioKind::Base => (self.theta_central, self.target_central),
            ScenarioKind::Positive => (self.theta_low, self.target_low),
            ScenarioKind::Negative => (self.theta_high, self.target_high),
        }
    }

    /// Reject parameter blocks the scenario builder cannot honour.
    ///
    /// A model horizon at or beyond the projection horizon is accepted: it
    /// simply yields no convergence months.
    pub fn validate(&self, years_to_project: u32) -> Result<(), AppError> {
        if !(MIN_YEARS_TO_PROJECT..=MAX_YEARS_TO_PROJECT).contains(&years_to_project) {
            return Err(AppError::ScenarioConfig(format!(
                "years to project must be in {MIN_YEARS_TO_PROJECT}..={MAX_YEARS_TO_PROJECT}, got {years_to_project}"
            )));
        }
        for kind in ScenarioKind::ALL {
            let (theta, target) = self.rule(kind);
            if !(theta.is_finite() && (0.0..=1.0).contains(&theta)) {
                return Err(AppError::ScenarioConfig(format!(
                    "{} theta must be in [0, 1], got {theta}",
                    kind.display_name()
                )));
            }
            if !target.is_finite() {
                return Err(AppError::ScenarioConfig(format!(
                    "{} target must be finite",
                    kind.display_name()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn aligned_series_accepts_contiguous_months() {
        let rows = vec![
            (d(2020, 11), [3.0, 4.0, 2.9]),
            (d(2020, 12), [3.1, 4.0, 2.9]),
            (d(2021, 1), [3.2, 4.25, 3.0]),
        ];
        let s = AlignedSeries::from_rows(&rows).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.last_date(), d(2021, 1));
        assert_eq!(s.last_value(Variable::PolicyRate), 4.25);
        assert_eq!(s.column(Variable::Inflation), vec![3.0, 3.1, 3.2]);
    }

    #[test]
    fn aligned_series_rejects_gaps_and_mid_month_dates() {
        let gap = vec![(d(2020, 1), [1.0, 1.0, 1.0]), (d(2020, 3), [1.0, 1.0, 1.0])];
        assert!(matches!(AlignedSeries::from_rows(&gap), Err(AppError::DataAlignment(_))));

        let mid = vec![(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(), [1.0, 1.0, 1.0])];
        assert!(matches!(AlignedSeries::from_rows(&mid), Err(AppError::DataAlignment(_))));

        let nan = vec![(d(2020, 1), [1.0, f64::NAN, 1.0])];
        assert!(matches!(AlignedSeries::from_rows(&nan), Err(AppError::DataAlignment(_))));
    }

    #[test]
    fn scenario_params_validation() {
        let params = ScenarioParams::for_country(Country::Mexico);
        assert!(params.validate(30).is_ok());
        assert!(params.validate(5).is_ok());
        assert!(matches!(params.validate(4), Err(AppError::ScenarioConfig(_))));
        assert!(matches!(params.validate(51), Err(AppError::ScenarioConfig(_))));

        let bad_theta = ScenarioParams {
            theta_high: 1.5,
            ..params
        };
        assert!(matches!(bad_theta.validate(30), Err(AppError::ScenarioConfig(_))));

        // Model horizon beyond the projection horizon is allowed.
        let long_model = ScenarioParams {
            years_model: 40,
            ..params
        };
        assert!(long_model.validate(30).is_ok());
    }

    #[test]
    fn month_start_is_first_of_month() {
        const START: NaiveDate = month_start(2002, 1);
        assert_eq!(START, d(2002, 1));
        assert_eq!(month_start(2024, 12).day(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid month start")]
    fn month_start_rejects_invalid_month() {
        let _ = month_start(2024, 13);
    }

    #[test]
    fn month_start_after_rolls_over_years() {
        assert_eq!(month_start_after(d(2024, 12), 1), Some(d(2025, 1)));
        assert_eq!(
            month_start_after(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), 1),
            Some(d(2024, 2))
        );
    }
}
