//! Diagnostics of the fitted model: inflation residuals and summary text.
//!
//! Read-only over already fitted state; never influences the scenarios.

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{AlignedSeries, Variable};
use crate::fit::FittedModel;
use crate::math::{Z_95, two_sided_p};
use crate::models::{VarResults, VecmResults};

pub mod format;

pub use format::*;

/// Residuals of the inflation equation, dated by the observation they explain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

/// Number of residual autocorrelation lags reported.
pub const ACF_LAGS: usize = 24;

/// Autocorrelation at one lag with its 95% Bartlett band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcfPoint {
    pub lag: usize,
    pub value: f64,
    pub half_width: f64,
}

impl AcfPoint {
    pub fn is_significant(&self) -> bool {
        self.value.abs() > self.half_width
    }
}

impl ResidualSeries {
    /// Sample autocorrelation for lags `1..=nlags`.
    ///
    /// Autocovariances divide by `n`. The band at lag `k` is
    /// `Z_95 * sqrt((1 + 2 * sum(rho_j^2, j < k)) / n)`. Lags beyond `n - 1`
    /// are dropped; a constant or too short series yields nothing.
    pub fn acf(&self, nlags: usize) -> Vec<AcfPoint> {
        let count = self.values.len();
        if count < 2 {
            return Vec::new();
        }
        let n = count as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let dev: Vec<f64> = self.values.iter().map(|v| v - mean).collect();
        let autocov = |lag: usize| dev[lag..].iter().zip(&dev).map(|(a, b)| a * b).sum::<f64>() / n;
        let c0 = autocov(0);
        if !c0.is_finite() || c0 <= 0.0 {
            return Vec::new();
        }

        let mut sum_sq = 0.0;
        (1..=nlags.min(count - 1))
            .map(|lag| {
                let value = autocov(lag) / c0;
                let half_width = Z_95 * ((1.0 + 2.0 * sum_sq) / n).sqrt();
                sum_sq += value * value;
                AcfPoint { lag, value, half_width }
            })
            .collect()
    }

    pub fn stats(&self) -> ResidualStats {
        let count = self.values.len();
        if count == 0 {
            return ResidualStats {
                count,
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let n = count as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let std = if count < 2 {
            0.0
        } else {
            (self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        ResidualStats { count, mean, std }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub residuals: ResidualSeries,
    pub summary: String,
}

pub fn extract_diagnostics(model: &FittedModel, series: &AlignedSeries) -> Diagnostics {
    Diagnostics {
        residuals: inflation_residuals(model, series),
        summary: model_summary(model),
    }
}

/// Column 0 of the residual matrix, aligned to the last `nobs` dates of the
/// table the model was estimated on.
pub fn inflation_residuals(model: &FittedModel, series: &AlignedSeries) -> ResidualSeries {
    let resid = model.residuals();
    let table_dates = match model {
        FittedModel::Var { working, .. } => working.dates.as_slice(),
        FittedModel::Vecm { .. } => series.dates(),
    };
    let skip = table_dates.len().saturating_sub(resid.nrows());
    ResidualSeries {
        dates: table_dates[skip..].to_vec(),
        values: resid.column(Variable::Inflation.index()).iter().copied().collect(),
    }
}

pub fn model_summary(model: &FittedModel) -> String {
    match model {
        FittedModel::Var { results, working } => var_summary(results, &working.differenced),
        FittedModel::Vecm { results, .. } => vecm_summary(results),
    }
}

fn var_summary(results: &VarResults, differenced: &[Variable]) -> String {
    let k = results.neqs();
    let mut out = String::new();
    out.push_str("Summary of Regression Results\n");
    out.push_str("==================================\n");
    out.push_str(&format!("Model:        VAR({})\n", results.lag_order));
    out.push_str(&format!("Observations: {}\n", results.nobs));
    out.push_str(&format!("Equations:    {k}\n"));
    out.push_str(&format!("AIC:          {:.6}\n", results.aic));
    if !differenced.is_empty() {
        let names: Vec<&str> = differenced.iter().map(|v| v.name()).collect();
        out.push_str(&format!("Differenced:  {}\n", names.join(", ")));
    }

    let regressors = var_regressor_names(results.lag_order);
    for (eq, var) in Variable::ALL.iter().enumerate().take(k) {
        out.push_str(&format!("\nResults for equation {var}\n"));
        out.push_str(&format!(
            "{:<18} {:>12} {:>12} {:>10} {:>8}\n",
            "", "coefficient", "std. error", "t-stat", "prob"
        ));
        out.push_str(&format!("{:-<64}\n", ""));
        for (row, name) in regressors.iter().enumerate() {
            let coef = results.params[(row, eq)];
            let se = results.stderr(row, eq);
            let t = if se > 0.0 { coef / se } else { f64::NAN };
            out.push_str(&format!(
                "{name:<18} {coef:>12.6} {se:>12.6} {t:>10.3} {:>8.3}\n",
                two_sided_p(t)
            ));
        }
    }

    out.push_str("\nCorrelation matrix of residuals\n");
    out.push_str(&format_matrix(&correlation(&results.sigma_u), &column_labels(k)));
    out
}

fn var_regressor_names(lags: usize) -> Vec<String> {
    let mut names = vec!["const".to_string()];
    for lag in 1..=lags {
        for var in Variable::ALL {
            names.push(format!("L{lag}.{var}"));
        }
    }
    names
}

fn vecm_summary(results: &VecmResults) -> String {
    let k = results.neqs();
    let labels = column_labels(k);
    let mut out = String::new();
    out.push_str("Vector error-correction model\n");
    out.push_str("==================================\n");
    out.push_str(&format!("Lagged differences:   {}\n", results.k_ar_diff));
    out.push_str(&format!("Cointegration rank:   {}\n", results.coint_rank));
    out.push_str("Deterministic terms:  constant inside the cointegrating relation\n");
    out.push_str(&format!("Observations:         {}\n", results.nobs));
    let eig: Vec<String> = results.eigenvalues.iter().map(|v| format!("{v:.6}")).collect();
    out.push_str(&format!("Eigenvalues:          [{}]\n", eig.join(", ")));

    for i in 1..=results.k_ar_diff {
        out.push_str(&format!("\nShort-run coefficients Γ{i} (rows: equations, columns: L{i}.Δ)\n"));
        out.push_str(&format_matrix(&results.gamma_block(i), &labels));
    }

    out.push_str("\nLoading coefficients α (rows: equations, columns: relations)\n");
    let relations: Vec<String> = (1..=results.coint_rank).map(|r| format!("ec{r}")).collect();
    out.push_str(&format_matrix(&results.alpha, &relations));

    out.push_str("\nCointegrating relations β (rows: variables + const)\n");
    out.push_str(&format_matrix(&results.beta, &relations));

    out.push_str("\nCorrelation matrix of residuals\n");
    out.push_str(&format_matrix(&correlation(&results.sigma_u), &labels));
    out
}

fn column_labels(k: usize) -> Vec<String> {
    Variable::ALL.iter().take(k).map(|v| v.name().to_string()).collect()
}

fn correlation(cov: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(cov.nrows(), cov.ncols(), |i, j| {
        let denom = (cov[(i, i)] * cov[(j, j)]).sqrt();
        if denom > 0.0 { cov[(i, j)] / denom } else { f64::NAN }
    })
}

fn format_matrix(m: &DMatrix<f64>, columns: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<14}", ""));
    for c in columns {
        out.push_str(&format!(" {c:>12}"));
    }
    out.push('\n');
    for r in 0..m.nrows() {
        let label = Variable::ALL.get(r).map(|v| v.name()).unwrap_or("const");
        out.push_str(&format!("{label:<14}"));
        for c in 0..m.ncols() {
            out.push_str(&format!(" {:>12.6}", m[(r, c)]));
        }
        out.push('\n');
    }
    out
}
