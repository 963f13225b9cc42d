//! Stationarity and cointegration analysis of an aligned series.
//!
//! Each auxiliary variable gets an ADF test; the non-stationary subset is then
//! tested for cointegration when it has at least two members. The Johansen
//! test runs at most once per analysis and its outcome is kept for both the
//! rank and the report.

use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::domain::{AlignedSeries, Variable};
use crate::error::AppError;
use crate::stats::{AdfOutcome, JohansenOutcome, adf_test, johansen_trace};

/// Lagged differences used by the cointegration test.
pub const JOHANSEN_K_AR_DIFF: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct StationarityVerdict {
    /// One entry per auxiliary variable, in `Variable::AUXILIARY` order.
    pub outcomes: Vec<(Variable, AdfOutcome)>,
}

impl StationarityVerdict {
    pub fn is_non_stationary(&self, var: Variable) -> bool {
        self.outcomes
            .iter()
            .any(|(v, out)| *v == var && out.is_non_stationary())
    }

    /// Non-stationary variables, in column order.
    pub fn non_stationary(&self) -> Vec<Variable> {
        self.outcomes
            .iter()
            .filter(|(_, out)| out.is_non_stationary())
            .map(|(v, _)| *v)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CointegrationVerdict {
    pub rank: usize,
    /// `None` when fewer than two variables were non-stationary.
    pub johansen: Option<JohansenOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub stationarity: StationarityVerdict,
    pub cointegration: CointegrationVerdict,
}

impl Analysis {
    pub fn non_stationary(&self) -> Vec<Variable> {
        self.stationarity.non_stationary()
    }
}

pub fn analyze(series: &AlignedSeries) -> Result<Analysis, AppError> {
    let stationarity = test_stationarity(series)?;
    let non_stationary = stationarity.non_stationary();
    let cointegration = test_cointegration(series, &non_stationary)?;
    Ok(Analysis {
        stationarity,
        cointegration,
    })
}

pub fn test_stationarity(series: &AlignedSeries) -> Result<StationarityVerdict, AppError> {
    let mut outcomes = Vec::with_capacity(Variable::AUXILIARY.len());
    for var in Variable::AUXILIARY {
        let out = adf_test(&series.column(var)).map_err(|e| match e {
            AppError::StatisticalTest { test, message } => AppError::StatisticalTest {
                test,
                message: format!("{var}: {message}"),
            },
            other => other,
        })?;
        info!(
            variable = %var,
            statistic = out.statistic,
            p_value = out.p_value,
            lags = out.used_lag,
            non_stationary = out.is_non_stationary(),
            "ADF test"
        );
        outcomes.push((var, out));
    }
    Ok(StationarityVerdict { outcomes })
}

/// Johansen trace test on exactly `non_stationary`; rank 0 when it has fewer
/// than two members.
pub fn test_cointegration(
    series: &AlignedSeries,
    non_stationary: &[Variable],
) -> Result<CointegrationVerdict, AppError> {
    if non_stationary.len() < 2 {
        debug!(
            count = non_stationary.len(),
            "fewer than two non-stationary variables, skipping cointegration test"
        );
        return Ok(CointegrationVerdict {
            rank: 0,
            johansen: None,
        });
    }

    let values = series.values();
    let subset = DMatrix::from_fn(values.nrows(), non_stationary.len(), |r, c| {
        values[(r, non_stationary[c].index())]
    });
    let outcome = johansen_trace(&subset, JOHANSEN_K_AR_DIFF)?;
    let rank = outcome.rank();
    info!(
        rank,
        trace = ?outcome.trace_stats,
        "Johansen trace test"
    );

    Ok(CointegrationVerdict {
        rank,
        johansen: Some(outcome),
    })
}
