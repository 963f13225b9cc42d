//! Johansen cointegration trace test.
//!
//! The series are demeaned (constant-only deterministic case), lagged
//! differences are partialled out of both `Δy_t` and the lagged levels, and the
//! squared canonical correlations `λ_1 ≥ … ≥ λ_m` between the two residual sets
//! give the trace statistics
//!
//! ```text
//! LR(r) = -T Σ_{j > r} ln(1 - λ_j)
//! ```
//!
//! The reported rank counts every trace statistic above its 95% critical value.

use nalgebra::DMatrix;

use crate::error::AppError;
use crate::math::{inverse_sqrt_spd, residualize, sorted_symmetric_eigen};

const TEST_NAME: &str = "Johansen trace test";

/// Osterwald-Lenum trace critical values (90%, 95%, 99%), constant term,
/// indexed by the number of non-stationary components `m - r` (1-based).
const TRACE_CRIT_CONST: [[f64; 3]; 5] = [
    [2.7055, 3.8415, 6.6349],
    [13.4294, 15.4943, 19.9349],
    [27.0669, 29.7961, 35.4628],
    [44.4929, 47.8545, 54.6815],
    [65.8202, 69.8189, 77.8202],
];

#[derive(Debug, Clone, PartialEq)]
pub struct JohansenOutcome {
    /// Squared canonical correlations, descending.
    pub eigenvalues: Vec<f64>,
    /// `trace_stats[r]` tests `rank <= r`.
    pub trace_stats: Vec<f64>,
    /// 90/95/99% critical values aligned with `trace_stats`.
    pub critical_values: Vec<[f64; 3]>,
    pub nobs: usize,
}

impl JohansenOutcome {
    /// Number of trace statistics exceeding their 95% critical value.
    pub fn rank(&self) -> usize {
        self.trace_stats
            .iter()
            .zip(&self.critical_values)
            .filter(|(stat, cv)| **stat > cv[1])
            .count()
    }
}

/// Run the trace test on the columns of `data` (`T x m`, levels).
pub fn johansen_trace(data: &DMatrix<f64>, k_ar_diff: usize) -> Result<JohansenOutcome, AppError> {
    let n_all = data.nrows();
    let m = data.ncols();
    if m == 0 || m > TRACE_CRIT_CONST.len() {
        return Err(AppError::stat_test(
            TEST_NAME,
            format!("critical values are tabulated for 1..={} series, got {m}", TRACE_CRIT_CONST.len()),
        ));
    }
    if n_all < k_ar_diff + 2 + m * (k_ar_diff + 1) + 2 {
        return Err(AppError::stat_test(
            TEST_NAME,
            format!("{n_all} observations are too few for {m} series with {k_ar_diff} lagged differences"),
        ));
    }

    let x = demean(data);
    let dx = DMatrix::from_fn(n_all - 1, m, |r, c| x[(r + 1, c)] - x[(r, c)]);

    // Rows follow Δy_t for t = k..; lag blocks are ordered Δy_{t-1}, Δy_{t-2}, ...
    let rows = dx.nrows() - k_ar_diff;
    let z = demean(&DMatrix::from_fn(rows, m * k_ar_diff, |r, c| {
        let lag = c / m + 1;
        dx[(r + k_ar_diff - lag, c % m)]
    }));
    let dx_t = demean(&dx.rows(k_ar_diff, rows).into_owned());
    let levels = demean(&x.rows(1, rows).into_owned());

    let r0t = residualize(&dx_t, &z)
        .ok_or_else(|| AppError::stat_test(TEST_NAME, "singular lagged-difference design (Δy)"))?;
    let rkt = residualize(&levels, &z)
        .ok_or_else(|| AppError::stat_test(TEST_NAME, "singular lagged-difference design (levels)"))?;

    let t = rows as f64;
    let skk = rkt.transpose() * &rkt / t;
    let sk0 = rkt.transpose() * &r0t / t;
    let s00 = r0t.transpose() * &r0t / t;

    let s00_inv = s00
        .try_inverse()
        .ok_or_else(|| AppError::stat_test(TEST_NAME, "residual covariance of Δy is singular"))?;
    let skk_isqrt = inverse_sqrt_spd(&skk)
        .ok_or_else(|| AppError::stat_test(TEST_NAME, "residual covariance of levels is not positive definite"))?;

    let m_sym = &skk_isqrt * &sk0 * s00_inv * sk0.transpose() * &skk_isqrt;
    let (eigenvalues, _) = sorted_symmetric_eigen(&m_sym);

    let mut lambdas = Vec::with_capacity(m);
    for &l in eigenvalues.iter() {
        if !(l.is_finite() && l < 1.0) {
            return Err(AppError::stat_test(TEST_NAME, format!("eigenvalue {l} outside [0, 1)")));
        }
        lambdas.push(l.max(0.0));
    }

    let log_terms: Vec<f64> = lambdas.iter().map(|l| (1.0 - l).ln()).collect();
    let trace_stats: Vec<f64> = (0..m).map(|i| -t * log_terms[i..].iter().sum::<f64>()).collect();
    let critical_values = (0..m).map(|i| TRACE_CRIT_CONST[m - i - 1]).collect();

    Ok(JohansenOutcome {
        eigenvalues: lambdas,
        trace_stats,
        critical_values,
        nobs: rows,
    })
}

fn demean(m: &DMatrix<f64>) -> DMatrix<f64> {
    if m.nrows() == 0 {
        return m.clone();
    }
    let mut out = m.clone();
    for mut col in out.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }
    out
}
