//! Augmented Dickey-Fuller unit-root test (constant, no trend).
//!
//! For a series `x` the test regression is
//!
//! ```text
//! Δx_t = α + γ x_{t-1} + Σ_{i=1..k} δ_i Δx_{t-i} + ε_t
//! ```
//!
//! and the statistic is the t-value of `γ`. The lag count `k` is chosen by
//! minimum AIC over `0..=maxlag`, every candidate fitted on the same sample
//! (the one the largest lag leaves), then the winner is re-fitted on the
//! longest sample it allows.
//!
//! p-values use MacKinnon's (1994) normal-CDF response surface for one variable
//! with a constant; critical values use MacKinnon (2010).

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::{OlsFit, norm_cdf};

const TEST_NAME: &str = "ADF test";

/// Null of a unit root is rejected when `p < SIGNIFICANCE`.
pub const SIGNIFICANCE: f64 = 0.05;

// MacKinnon (1994), N = 1, constant.
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010), N = 1, constant: rows are 1%, 5%, 10%.
const TAU_C_CRIT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
    pub one: f64,
    pub five: f64,
    pub ten: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
    /// AIC of the winning lag during the search.
    pub ic_best: f64,
}

impl AdfOutcome {
    /// Unit root not rejected at the 5% level.
    pub fn is_non_stationary(&self) -> bool {
        self.p_value >= SIGNIFICANCE
    }
}

/// Run the ADF test on a single series.
pub fn adf_test(x: &[f64]) -> Result<AdfOutcome, AppError> {
    let n = x.len();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(AppError::stat_test(TEST_NAME, "series contains non-finite values"));
    }
    if x.windows(2).all(|w| w[0] == w[1]) {
        return Err(AppError::stat_test(TEST_NAME, "series is constant"));
    }

    // One constant term plus the lagged level.
    let cap = (n / 2).checked_sub(2).ok_or_else(|| {
        AppError::stat_test(TEST_NAME, format!("sample of {n} observations is too short"))
    })?;
    let maxlag = default_maxlag(n).min(cap);

    let xdiff: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lags in 0..=maxlag {
        let (design, dep) = design_matrix(x, &xdiff, lags, maxlag);
        let fit = OlsFit::fit(&design, &dep).ok_or_else(|| {
            AppError::stat_test(TEST_NAME, format!("auxiliary regression with {lags} lags is singular"))
        })?;
        let aic = fit.aic();
        if best.is_none_or(|(b, _)| aic < b) {
            best = Some((aic, lags));
        }
    }
    let (ic_best, used_lag) =
        best.ok_or_else(|| AppError::stat_test(TEST_NAME, "no lag candidates evaluated"))?;

    let (design, dep) = design_matrix(x, &xdiff, used_lag, used_lag);
    let fit = OlsFit::fit(&design, &dep).ok_or_else(|| {
        AppError::stat_test(TEST_NAME, format!("final regression with {used_lag} lags is singular"))
    })?;
    let statistic = fit.tvalue(0);
    if !statistic.is_finite() {
        return Err(AppError::stat_test(TEST_NAME, "non-finite test statistic"));
    }

    Ok(AdfOutcome {
        statistic,
        p_value: mackinnon_p(statistic),
        used_lag,
        nobs: fit.nobs,
        critical_values: mackinnon_crit(fit.nobs),
        ic_best,
    })
}

/// Schwert's rule `ceil(12 (n/100)^{1/4})`.
fn default_maxlag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Regression of `Δx_t` on `[x_{t-1}, 1, Δx_{t-1}, …, Δx_{t-lags}]` for `t >= start`.
///
/// `xdiff[t] = x[t+1] - x[t]`, so the lagged level paired with `xdiff[t]` is `x[t]`.
fn design_matrix(x: &[f64], xdiff: &[f64], lags: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = xdiff.len() - start;
    let cols = 2 + lags;
    let mut design = DMatrix::zeros(rows, cols);
    let mut dep = DVector::zeros(rows);

    for i in 0..rows {
        let t = start + i;
        dep[i] = xdiff[t];
        design[(i, 0)] = x[t];
        design[(i, 1)] = 1.0;
        for j in 1..=lags {
            design[(i, 1 + j)] = xdiff[t - j];
        }
    }
    (design, dep)
}

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// MacKinnon (1994) approximate p-value of an ADF statistic.
pub fn mackinnon_p(stat: f64) -> f64 {
    if stat > TAU_MAX_C {
        return 1.0;
    }
    if stat < TAU_MIN_C {
        return 0.0;
    }
    let z = if stat <= TAU_STAR_C {
        polyval(&TAU_C_SMALLP, stat)
    } else {
        polyval(&TAU_C_LARGEP, stat)
    };
    norm_cdf(z)
}

/// MacKinnon (2010) finite-sample critical values for `nobs` observations.
pub fn mackinnon_crit(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    CriticalValues {
        one: polyval(&TAU_C_CRIT[0], inv),
        five: polyval(&TAU_C_CRIT[1], inv),
        ten: polyval(&TAU_C_CRIT[2], inv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn noise(seed: u64, n: usize, sd: f64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sd).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn mackinnon_p_matches_reference_points() {
        assert!((mackinnon_p(-2.86) - 0.05).abs() < 0.002);
        assert!((mackinnon_p(-3.43) - 0.01).abs() < 0.001);
        assert!((mackinnon_p(0.0) - 0.9586).abs() < 0.001);
        assert_eq!(mackinnon_p(3.0), 1.0);
        assert_eq!(mackinnon_p(-25.0), 0.0);
    }

    #[test]
    fn mackinnon_p_is_continuous_at_switch_point() {
        let below = mackinnon_p(TAU_STAR_C - 1e-9);
        let above = mackinnon_p(TAU_STAR_C + 1e-9);
        assert!((below - above).abs() < 1e-3);
    }

    #[test]
    fn critical_values_approach_asymptotic() {
        let cv = mackinnon_crit(100_000);
        assert!((cv.five + 2.8615).abs() < 1e-3);
        let small = mackinnon_crit(100);
        assert!(small.one < small.five && small.five < small.ten);
    }

    #[test]
    fn stationary_series_rejects_unit_root() {
        let e = noise(7, 240, 1.0);
        let mut x = vec![0.0; e.len()];
        for t in 1..x.len() {
            x[t] = 0.4 * x[t - 1] + e[t];
        }
        let out = adf_test(&x).unwrap();
        assert!(out.statistic < out.critical_values.one, "{out:?}");
        assert!(!out.is_non_stationary());
    }

    #[test]
    fn drifting_random_walk_is_non_stationary() {
        let e = noise(11, 240, 0.02);
        let mut x = vec![1.0; e.len()];
        for t in 1..x.len() {
            x[t] = x[t - 1] + 0.01 + e[t];
        }
        let out = adf_test(&x).unwrap();
        assert!(out.is_non_stationary(), "{out:?}");
    }

    #[test]
    fn short_or_constant_series_fail() {
        assert!(matches!(adf_test(&[1.0, 2.0, 3.0]), Err(AppError::StatisticalTest { .. })));
        assert!(matches!(adf_test(&[2.0; 50]), Err(AppError::StatisticalTest { .. })));
    }

    #[test]
    fn maxlag_follows_schwert_rule() {
        assert_eq!(default_maxlag(100), 12);
        assert_eq!(default_maxlag(200), 15);
    }
}
