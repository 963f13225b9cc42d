//! Vector autoregression with intercept, estimated equation by equation with OLS.
//!
//! For lag order `p` the design row for `y_t` is `[1, y_{t-1}ᵀ, …, y_{t-p}ᵀ]`, so
//! `params` is `(1 + K p) x K` with one column per equation.

use nalgebra::{DMatrix, DVector};

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::math::{logdet_spd, solve_least_squares};
use crate::models::VarRepresentation;

#[derive(Debug, Clone, PartialEq)]
pub struct VarResults {
    pub lag_order: usize,
    pub params: DMatrix<f64>,
    /// Residual covariance, degrees-of-freedom adjusted.
    pub sigma_u: DMatrix<f64>,
    /// `nobs x K` residuals.
    pub resid: DMatrix<f64>,
    pub nobs: usize,
    pub df_resid: usize,
    /// `(ZᵀZ)⁻¹`, used for coefficient standard errors.
    pub zz_inv: DMatrix<f64>,
    /// `ln|Σ_mle| + 2 (p K² + K) / nobs`.
    pub aic: f64,
}

/// Estimate a VAR(`lags`) on `data[offset..]`.
///
/// `offset` lets a lag search evaluate every order on the same sample.
/// `model` only labels errors.
pub fn estimate_var(
    data: &DMatrix<f64>,
    lags: usize,
    offset: usize,
    model: ModelKind,
) -> Result<VarResults, AppError> {
    const STEP: &str = "VAR least squares";

    if lags == 0 {
        return Err(AppError::estimation(model, STEP, "lag order must be at least 1"));
    }
    if offset + lags >= data.nrows() {
        return Err(AppError::estimation(
            model,
            STEP,
            format!("{} observations leave no sample for {lags} lags", data.nrows()),
        ));
    }
    let endog = data.rows(offset, data.nrows() - offset);
    let k = endog.ncols();
    let nobs = endog.nrows() - lags;
    let ncoef = 1 + k * lags;
    if nobs <= ncoef {
        return Err(AppError::estimation(
            model,
            STEP,
            format!("{nobs} observations are too few for {ncoef} coefficients per equation"),
        ));
    }

    let z = DMatrix::from_fn(nobs, ncoef, |i, c| {
        if c == 0 {
            1.0
        } else {
            let lag = (c - 1) / k + 1;
            endog[(lags + i - lag, (c - 1) % k)]
        }
    });
    let y = endog.rows(lags, nobs).into_owned();

    let params = solve_least_squares(&z, &y)
        .ok_or_else(|| AppError::estimation(model, STEP, "design matrix is ill-conditioned"))?;
    let resid = &y - &z * &params;

    let df_resid = nobs - ncoef;
    let sigma_u = resid.transpose() * &resid / df_resid as f64;
    let sigma_mle = &sigma_u * (df_resid as f64 / nobs as f64);
    let logdet = logdet_spd(&sigma_mle)
        .ok_or_else(|| AppError::estimation(model, STEP, "residual covariance is singular"))?;
    let aic = logdet + 2.0 / nobs as f64 * (lags * k * k + k) as f64;

    let zz_inv = (z.transpose() * &z)
        .try_inverse()
        .ok_or_else(|| AppError::estimation(model, STEP, "ZᵀZ is singular"))?;

    Ok(VarResults {
        lag_order: lags,
        params,
        sigma_u,
        resid,
        nobs,
        df_resid,
        zz_inv,
        aic,
    })
}

impl VarResults {
    pub fn neqs(&self) -> usize {
        self.params.ncols()
    }

    /// Standard error of `params[(row, eq)]`.
    pub fn stderr(&self, row: usize, eq: usize) -> f64 {
        (self.zz_inv[(row, row)] * self.sigma_u[(eq, eq)]).max(0.0).sqrt()
    }

    pub fn representation(&self) -> VarRepresentation {
        let k = self.neqs();
        let intercept = DVector::from_iterator(k, (0..k).map(|eq| self.params[(0, eq)]));
        let coefs = (1..=self.lag_order)
            .map(|lag| DMatrix::from_fn(k, k, |eq, var| self.params[(1 + (lag - 1) * k + var, eq)]))
            .collect();
        VarRepresentation {
            intercept,
            coefs,
            sigma_u: self.sigma_u.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    /// Bivariate VAR(1) with `A = [[0.5, 0.1], [0.0, 0.3]]`, `c = [1, -1]`.
    fn simulate(seed: u64, n: usize) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 0.5).unwrap();
        let mut data = DMatrix::zeros(n, 2);
        let (mut a, mut b) = (2.0, -1.4);
        for r in 0..n {
            let na = 1.0 + 0.5 * a + 0.1 * b + normal.sample(&mut rng);
            let nb = -1.0 + 0.3 * b + normal.sample(&mut rng);
            a = na;
            b = nb;
            data[(r, 0)] = a;
            data[(r, 1)] = b;
        }
        data
    }

    #[test]
    fn recovers_var1_coefficients() {
        let data = simulate(5, 2000);
        let fit = estimate_var(&data, 1, 0, ModelKind::VarDifferenced).unwrap();
        let rep = fit.representation();

        assert_eq!(fit.nobs, 1999);
        assert!((rep.coefs[0][(0, 0)] - 0.5).abs() < 0.08);
        assert!((rep.coefs[0][(0, 1)] - 0.1).abs() < 0.08);
        assert!((rep.coefs[0][(1, 0)]).abs() < 0.08);
        assert!((rep.coefs[0][(1, 1)] - 0.3).abs() < 0.08);
        assert!((fit.sigma_u[(0, 0)] - 0.25).abs() < 0.05);
        assert!(fit.stderr(1, 0) > 0.0);
    }

    #[test]
    fn offset_trims_the_front_of_the_sample() {
        let data = simulate(9, 300);
        let full = estimate_var(&data, 2, 0, ModelKind::VarDifferenced).unwrap();
        let trimmed = estimate_var(&data, 2, 10, ModelKind::VarDifferenced).unwrap();
        assert_eq!(full.nobs, 298);
        assert_eq!(trimmed.nobs, 288);
        assert_eq!(full.resid.nrows(), full.nobs);
    }

    #[test]
    fn too_many_lags_is_an_estimation_error() {
        let data = simulate(1, 20);
        let err = estimate_var(&data, 12, 0, ModelKind::Vecm).unwrap_err();
        assert!(matches!(err, AppError::Estimation { model: ModelKind::Vecm, .. }));
    }
}
