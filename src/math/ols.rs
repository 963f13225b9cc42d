//! Ordinary least squares.
//!
//! Every regression in the engine (ADF auxiliary regressions, VAR equations,
//! Johansen partialling-out) reduces to `minimize ||y - Xβ||²`.
//!
//! Implementation choices:
//! - β is solved with SVD so tall, slightly collinear designs still solve.
//!   (Nalgebra's `QR::solve` is intended for square systems.)
//! - Standard errors need `(XᵀX)⁻¹`, which is only formed when asked for.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// `y` may hold several right-hand sides (one per column); they share the
/// decomposition of `x`. Returns `None` if the system is too ill-conditioned.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if x.nrows() != y.nrows() || x.nrows() < x.ncols() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Residuals of `y` after projecting out the columns of `x`.
///
/// An empty `x` leaves `y` untouched.
pub fn residualize(y: &DMatrix<f64>, x: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if x.ncols() == 0 {
        return Some(y.clone());
    }
    let beta = solve_least_squares(x, y)?;
    Some(y - x * beta)
}

/// Single-equation OLS fit with the statistics used by the unit-root test.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    pub bse: DVector<f64>,
    pub resid: DVector<f64>,
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<Self> {
        let n = x.nrows();
        let k = x.ncols();
        if n <= k {
            return None;
        }

        let y_mat = DMatrix::from_column_slice(n, 1, y.as_slice());
        let params = solve_least_squares(x, &y_mat)?.column(0).into_owned();
        let resid = y - x * &params;
        let ssr = resid.dot(&resid);

        let xtx_inv = (x.transpose() * x).try_inverse()?;
        let scale = ssr / (n - k) as f64;
        let bse = DVector::from_iterator(k, (0..k).map(|j| (scale * xtx_inv[(j, j)]).max(0.0).sqrt()));

        Some(Self {
            params,
            bse,
            resid,
            ssr,
            nobs: n,
        })
    }

    pub fn tvalue(&self, j: usize) -> f64 {
        self.params[j] / self.bse[j]
    }

    /// Gaussian log-likelihood at the MLE of the error variance.
    pub fn llf(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// `-2 llf + 2k`, with `k` counting every regressor including the constant.
    pub fn aic(&self) -> f64 {
        -2.0 * self.llf() + 2.0 * self.params.len() as f64
    }
}
