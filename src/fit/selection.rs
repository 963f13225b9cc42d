//! VAR-versus-VECM decision and estimation of the chosen model.
//!
//! Decision cascade:
//! 1. fewer than two non-stationary auxiliaries: VAR on the working table
//!    (only the non-stationary variables differenced)
//! 2. cointegration rank > 0: VECM on levels
//! 3. otherwise: VAR on the working table, as in 1

use chrono::NaiveDate;
use nalgebra::DMatrix;
use tracing::info;

use crate::analysis::Analysis;
use crate::domain::{AlignedSeries, ModelKind, Variable};
use crate::error::AppError;
use crate::fit::{MAX_LAGS, select_lag_order};
use crate::models::{VarRepresentation, VarResults, VecmResults, estimate_var, estimate_vecm};

/// Which branch of the cascade produced the model choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fewer than two non-stationary auxiliaries; no cointegration test ran.
    FewNonStationary,
    /// Johansen found no cointegrating relation.
    NotCointegrated,
    /// Johansen found `rank` cointegrating relations.
    Cointegrated { rank: usize },
}

impl Decision {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        if analysis.non_stationary().len() < 2 {
            Decision::FewNonStationary
        } else if analysis.cointegration.rank > 0 {
            Decision::Cointegrated {
                rank: analysis.cointegration.rank,
            }
        } else {
            Decision::NotCointegrated
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelChoice {
    VarDifferenced {
        lag_order: usize,
        /// Variables modelled in first differences; re-leveled after forecasting.
        differenced: Vec<Variable>,
    },
    Vecm {
        /// AIC lag order of a levels VAR.
        lag_order: usize,
        k_ar_diff: usize,
        coint_rank: usize,
    },
}

impl ModelChoice {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelChoice::VarDifferenced { .. } => ModelKind::VarDifferenced,
            ModelChoice::Vecm { .. } => ModelKind::Vecm,
        }
    }

    pub fn lag_order(&self) -> usize {
        match self {
            ModelChoice::VarDifferenced { lag_order, .. } | ModelChoice::Vecm { lag_order, .. } => *lag_order,
        }
    }

    pub fn coint_rank(&self) -> usize {
        match self {
            ModelChoice::VarDifferenced { .. } => 0,
            ModelChoice::Vecm { coint_rank, .. } => *coint_rank,
        }
    }

    /// Empty for the VECM, which works on levels.
    pub fn differenced(&self) -> &[Variable] {
        match self {
            ModelChoice::VarDifferenced { differenced, .. } => differenced.as_slice(),
            ModelChoice::Vecm { .. } => &[],
        }
    }
}

/// The table a VAR is estimated on: levels, with `differenced` columns
/// replaced by their first differences (and the first row dropped when any
/// column is differenced).
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingTable {
    pub dates: Vec<NaiveDate>,
    pub values: DMatrix<f64>,
    pub differenced: Vec<Variable>,
}

pub fn working_table(series: &AlignedSeries, differenced: &[Variable]) -> WorkingTable {
    let levels = series.values();
    if differenced.is_empty() {
        return WorkingTable {
            dates: series.dates().to_vec(),
            values: levels.clone(),
            differenced: Vec::new(),
        };
    }

    let rows = levels.nrows().saturating_sub(1);
    let values = DMatrix::from_fn(rows, levels.ncols(), |r, c| {
        if differenced.iter().any(|v| v.index() == c) {
            levels[(r + 1, c)] - levels[(r, c)]
        } else {
            levels[(r + 1, c)]
        }
    });
    let mut differenced = differenced.to_vec();
    differenced.sort();
    WorkingTable {
        dates: series.dates().iter().skip(1).copied().collect(),
        values,
        differenced,
    }
}

/// A fitted estimator together with what forecasting needs from it.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedModel {
    Var {
        results: VarResults,
        working: WorkingTable,
    },
    Vecm {
        results: VecmResults,
        levels_lag_order: usize,
    },
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Var { .. } => ModelKind::VarDifferenced,
            FittedModel::Vecm { .. } => ModelKind::Vecm,
        }
    }

    pub fn choice(&self) -> ModelChoice {
        match self {
            FittedModel::Var { results, working } => ModelChoice::VarDifferenced {
                lag_order: results.lag_order,
                differenced: working.differenced.clone(),
            },
            FittedModel::Vecm {
                results,
                levels_lag_order,
            } => ModelChoice::Vecm {
                lag_order: *levels_lag_order,
                k_ar_diff: results.k_ar_diff,
                coint_rank: results.coint_rank,
            },
        }
    }

    pub fn representation(&self) -> VarRepresentation {
        match self {
            FittedModel::Var { results, .. } => results.representation(),
            FittedModel::Vecm { results, .. } => results.representation(),
        }
    }

    /// `nobs x K` residuals in column order.
    pub fn residuals(&self) -> &DMatrix<f64> {
        match self {
            FittedModel::Var { results, .. } => &results.resid,
            FittedModel::Vecm { results, .. } => &results.resid,
        }
    }
}

/// Run the decision cascade on `analysis` and estimate the chosen model.
pub fn fit_model(series: &AlignedSeries, analysis: &Analysis) -> Result<FittedModel, AppError> {
    let decision = Decision::from_analysis(analysis);
    let fitted = match decision {
        Decision::Cointegrated { rank } => fit_vecm(series, rank)?,
        Decision::FewNonStationary | Decision::NotCointegrated => fit_var(series, &analysis.non_stationary())?,
    };

    let choice = fitted.choice();
    info!(
        ?decision,
        model = %choice.kind(),
        lag_order = choice.lag_order(),
        coint_rank = choice.coint_rank(),
        differenced = ?choice.differenced(),
        "model selected"
    );
    Ok(fitted)
}

fn fit_var(series: &AlignedSeries, differenced: &[Variable]) -> Result<FittedModel, AppError> {
    let model = ModelKind::VarDifferenced;
    let working = working_table(series, differenced);
    let selection = select_lag_order(&working.values, MAX_LAGS, model)?;
    let results = estimate_var(&working.values, selection.order, 0, model)?;
    Ok(FittedModel::Var { results, working })
}

fn fit_vecm(series: &AlignedSeries, rank: usize) -> Result<FittedModel, AppError> {
    let levels = series.values();
    let selection = select_lag_order(levels, MAX_LAGS, ModelKind::Vecm)?;
    let k_ar_diff = selection.order.saturating_sub(1);
    let results = estimate_vecm(levels, k_ar_diff, rank)?;
    Ok(FittedModel::Vecm {
        results,
        levels_lag_order: selection.order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::fixtures;
    use crate::data::sample::{SampleSpec, generate_aligned};

    #[test]
    fn working_table_differences_only_listed_columns() {
        let series = generate_aligned(&SampleSpec::one_trending(80, 2)).unwrap();
        let table = working_table(&series, &[Variable::FxLog]);
        let levels = series.values();

        assert_eq!(table.values.nrows(), 79);
        assert_eq!(table.dates[0], series.dates()[1]);
        assert_eq!(table.values[(0, 0)], levels[(1, 0)]);
        assert_eq!(table.values[(0, 1)], levels[(1, 1)]);
        assert!((table.values[(0, 2)] - (levels[(1, 2)] - levels[(0, 2)])).abs() < 1e-15);
    }

    #[test]
    fn working_table_without_differencing_is_levels() {
        let series = generate_aligned(&SampleSpec::stationary(70, 4)).unwrap();
        let table = working_table(&series, &[]);
        assert_eq!(&table.values, series.values());
        assert_eq!(table.dates, series.dates());
    }

    #[test]
    fn stationary_auxiliaries_fit_a_levels_var() {
        let (series, analysis) = fixtures::stationary();
        let fitted = fit_model(&series, &analysis).unwrap();

        let choice = fitted.choice();
        assert_eq!(choice.kind(), ModelKind::VarDifferenced);
        assert!(choice.differenced().is_empty());
        assert!((1..=MAX_LAGS).contains(&choice.lag_order()));
    }

    #[test]
    fn single_trending_variable_is_differenced_alone() {
        let (series, analysis) = fixtures::one_trending();
        let fitted = fit_model(&series, &analysis).unwrap();

        assert_eq!(fitted.kind(), ModelKind::VarDifferenced);
        assert_eq!(fitted.choice().differenced(), &[Variable::FxLog]);
        assert_eq!(fitted.residuals().ncols(), 3);
    }

    #[test]
    fn uncointegrated_trends_difference_both_auxiliaries() {
        let (series, analysis) = fixtures::not_cointegrated();
        assert_eq!(Decision::from_analysis(&analysis), Decision::NotCointegrated);

        let fitted = fit_model(&series, &analysis).unwrap();
        assert_eq!(fitted.kind(), ModelKind::VarDifferenced);
        assert_eq!(fitted.choice().differenced(), &[Variable::PolicyRate, Variable::FxLog]);
        assert_eq!(fitted.residuals().ncols(), 3);
    }

    #[test]
    fn cointegrated_auxiliaries_fit_a_vecm() {
        let (series, analysis) = fixtures::cointegrated();
        let fitted = fit_model(&series, &analysis).unwrap();

        match fitted.choice() {
            ModelChoice::Vecm {
                lag_order,
                k_ar_diff,
                coint_rank,
            } => {
                assert_eq!(k_ar_diff, lag_order.saturating_sub(1));
                assert_eq!(coint_rank, analysis.cointegration.rank);
            }
            other => panic!("expected VECM, got {other:?}"),
        }
    }
}
