//! Multi-step forecasts with 95% bounds and level reconstruction.
//!
//! Both estimators forecast through their `VarRepresentation`. A VAR on a
//! working table yields differenced units for the differenced variables;
//! `reconstruct_levels` turns those back into levels by cumulative summation
//! from the last observed level.

use chrono::NaiveDate;
use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::domain::{AlignedSeries, Variable, month_start_after};
use crate::error::AppError;
use crate::fit::FittedModel;

/// Point forecast and 95% bounds over consecutive future months.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBundle {
    pub dates: Vec<NaiveDate>,
    /// `steps x 3`, `Variable::ALL` column order.
    pub point: DMatrix<f64>,
    pub lower: DMatrix<f64>,
    pub upper: DMatrix<f64>,
    /// Columns still in first differences. Empty once reconstructed.
    pub differenced: Vec<Variable>,
}

impl ForecastBundle {
    pub fn steps(&self) -> usize {
        self.dates.len()
    }

    pub fn is_levels(&self) -> bool {
        self.differenced.is_empty()
    }

    pub fn point_column(&self, var: Variable) -> Vec<f64> {
        self.point.column(var.index()).iter().copied().collect()
    }

    pub fn lower_column(&self, var: Variable) -> Vec<f64> {
        self.lower.column(var.index()).iter().copied().collect()
    }

    pub fn upper_column(&self, var: Variable) -> Vec<f64> {
        self.upper.column(var.index()).iter().copied().collect()
    }
}

/// `steps` month starts beginning one month after `last`.
pub fn forecast_dates(last: NaiveDate, steps: usize) -> Result<Vec<NaiveDate>, AppError> {
    (1..=steps)
        .map(|h| {
            u32::try_from(h)
                .ok()
                .and_then(|h| month_start_after(last, h))
                .ok_or_else(|| AppError::Config(format!("forecast date {h} months after {last} is out of range")))
        })
        .collect()
}

/// Forecast `steps` months in the model's working units.
pub fn forecast(model: &FittedModel, series: &AlignedSeries, steps: usize) -> Result<ForecastBundle, AppError> {
    let kind = model.kind();
    let (history, differenced) = match model {
        FittedModel::Var { working, .. } => (&working.values, working.differenced.clone()),
        FittedModel::Vecm { .. } => (series.values(), Vec::new()),
    };

    let repr = model.representation();
    let raw = repr
        .forecast_interval(history, steps)
        .ok_or_else(|| AppError::estimation(kind, "forecast", "forecast recursion produced non-finite bounds"))?;
    if raw.point.iter().any(|v| !v.is_finite()) {
        return Err(AppError::estimation(kind, "forecast", "non-finite point forecast"));
    }

    let dates = forecast_dates(series.last_date(), steps)?;
    debug!(
        model = %kind,
        steps,
        seed_rows = repr.lag_order(),
        first = ?dates.first(),
        "forecast"
    );

    Ok(ForecastBundle {
        dates,
        point: raw.point,
        lower: raw.lower,
        upper: raw.upper,
        differenced,
    })
}

/// Re-level every differenced column of point, lower and upper independently:
/// `last_observed_level + cumsum(column)`.
pub fn reconstruct_levels(mut bundle: ForecastBundle, series: &AlignedSeries) -> ForecastBundle {
    for var in std::mem::take(&mut bundle.differenced) {
        let last = series.last_value(var);
        for table in [&mut bundle.point, &mut bundle.lower, &mut bundle.upper] {
            let mut level = last;
            for v in table.column_mut(var.index()).iter_mut() {
                level += *v;
                *v = level;
            }
        }
        info!(variable = %var, last_level = last, "reconstructed levels");
    }
    bundle
}

/// Forecast and reconstruct in one step.
pub fn forecast_levels(model: &FittedModel, series: &AlignedSeries, steps: usize) -> Result<ForecastBundle, AppError> {
    Ok(reconstruct_levels(forecast(model, series, steps)?, series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::fixtures;
    use crate::fit::fit_model;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn dates_start_one_month_after_history() {
        let dates = forecast_dates(d(2024, 11), 3).unwrap();
        assert_eq!(dates, vec![d(2024, 12), d(2025, 1), d(2025, 2)]);
    }

    #[test]
    fn reconstruction_cumulates_each_band_from_last_level() {
        let series = AlignedSeries::from_rows(&[
            (d(2024, 1), [4.0, 10.0, 3.0]),
            (d(2024, 2), [4.1, 11.0, 3.5]),
        ])
        .unwrap();
        let bundle = ForecastBundle {
            dates: forecast_dates(d(2024, 2), 3).unwrap(),
            point: DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.1, 4.0, 1.0, 0.1, 4.0, 1.0, 0.1]),
            lower: DMatrix::from_row_slice(3, 3, &[3.0, 0.5, 0.0, 3.0, 0.5, 0.0, 3.0, 0.5, 0.0]),
            upper: DMatrix::from_row_slice(3, 3, &[5.0, 2.0, 0.2, 5.0, 2.0, 0.2, 5.0, 2.0, 0.2]),
            differenced: vec![Variable::PolicyRate],
        };

        let out = reconstruct_levels(bundle, &series);
        assert!(out.is_levels());
        assert_eq!(out.point_column(Variable::PolicyRate), vec![12.0, 13.0, 14.0]);
        assert_eq!(out.lower_column(Variable::PolicyRate), vec![11.5, 12.0, 12.5]);
        assert_eq!(out.upper_column(Variable::PolicyRate), vec![13.0, 15.0, 17.0]);
        // Untouched columns pass through.
        assert_eq!(out.point_column(Variable::FxLog), vec![0.1, 0.1, 0.1]);
        assert_eq!(out.point_column(Variable::Inflation), vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn var_forecast_bounds_are_ordered() {
        let (series, analysis) = fixtures::one_trending();
        let model = fit_model(&series, &analysis).unwrap();
        let raw = forecast(&model, &series, 60).unwrap();
        assert_eq!(raw.differenced, vec![Variable::FxLog]);

        let bundle = reconstruct_levels(raw, &series);
        assert_eq!(bundle.steps(), 60);
        assert_eq!(bundle.dates[0], month_start_after(series.last_date(), 1).unwrap());
        for t in 0..bundle.steps() {
            for c in 0..3 {
                assert!(bundle.upper[(t, c)] >= bundle.point[(t, c)]);
                assert!(bundle.point[(t, c)] >= bundle.lower[(t, c)]);
            }
        }
    }

    #[test]
    fn vecm_forecast_is_in_levels() {
        let (series, analysis) = fixtures::cointegrated();
        let model = fit_model(&series, &analysis).unwrap();
        let bundle = forecast_levels(&model, &series, 24).unwrap();

        assert!(bundle.is_levels());
        // First step stays close to the last observed fx level.
        let fx0 = bundle.point[(0, Variable::FxLog.index())];
        assert!((fx0 - series.last_value(Variable::FxLog)).abs() < 0.1);
    }
}
