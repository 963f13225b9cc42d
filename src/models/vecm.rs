//! Vector error-correction model, Johansen maximum-likelihood estimation.
//!
//! ```text
//! Δy_t = α βᵀ [y_{t-1}; 1] + Σ_{i=1..k} Γ_i Δy_{t-i} + u_t
//! ```
//!
//! The constant lives only inside the cointegrating relation (last row of
//! `β`). `β` is normalized so its first `r` rows form the identity.

use nalgebra::{DMatrix, DVector};

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::math::{inverse_sqrt_spd, sorted_symmetric_eigen};
use crate::models::VarRepresentation;

const MODEL: ModelKind = ModelKind::Vecm;

#[derive(Debug, Clone, PartialEq)]
pub struct VecmResults {
    pub k_ar_diff: usize,
    pub coint_rank: usize,
    /// `K x r` loadings.
    pub alpha: DMatrix<f64>,
    /// `(K + 1) x r` cointegrating vectors; last row is the restricted constant.
    pub beta: DMatrix<f64>,
    /// `K x (K k_ar_diff)`, blocks `Γ_1 | Γ_2 | …`.
    pub gamma: DMatrix<f64>,
    /// `resid residᵀ / T`.
    pub sigma_u: DMatrix<f64>,
    /// `nobs x K` residuals.
    pub resid: DMatrix<f64>,
    pub nobs: usize,
    /// Canonical correlations of the reduced-rank problem, descending.
    pub eigenvalues: Vec<f64>,
}

/// Estimate a VECM on `levels` (`T x K`).
pub fn estimate_vecm(levels: &DMatrix<f64>, k_ar_diff: usize, coint_rank: usize) -> Result<VecmResults, AppError> {
    let y = levels.transpose();
    let (k, n) = y.shape();
    let p = k_ar_diff + 1;

    if coint_rank == 0 || coint_rank > k {
        return Err(AppError::estimation(
            MODEL,
            "setup",
            format!("cointegration rank must be in 1..={k}, got {coint_rank}"),
        ));
    }
    if n <= p + k * p + 1 {
        return Err(AppError::estimation(
            MODEL,
            "setup",
            format!("{n} observations are too few for {k_ar_diff} lagged differences"),
        ));
    }
    let t = n - p;
    let tf = t as f64;

    let dy = DMatrix::from_fn(k, t, |i, j| y[(i, p + j)] - y[(i, p + j - 1)]);
    let y_lag1 = DMatrix::from_fn(k + 1, t, |i, j| if i < k { y[(i, p + j - 1)] } else { 1.0 });
    let dx = DMatrix::from_fn(k * k_ar_diff, t, |i, j| {
        let lag = i / k + 1;
        let var = i % k;
        y[(var, p + j - lag)] - y[(var, p + j - lag - 1)]
    });

    let dxdx_inv = if k_ar_diff > 0 {
        Some(
            (&dx * dx.transpose())
                .try_inverse()
                .ok_or_else(|| AppError::estimation(MODEL, "partialling out lagged differences", "ΔX ΔXᵀ is singular"))?,
        )
    } else {
        None
    };

    let partial = |m: &DMatrix<f64>| -> DMatrix<f64> {
        match &dxdx_inv {
            Some(inv) => m - m * dx.transpose() * inv * &dx,
            None => m.clone(),
        }
    };
    let r0 = partial(&dy);
    let r1 = partial(&y_lag1);

    let s00 = &r0 * r0.transpose() / tf;
    let s01 = &r0 * r1.transpose() / tf;
    let s11 = &r1 * r1.transpose() / tf;

    let s00_inv = s00
        .try_inverse()
        .ok_or_else(|| AppError::estimation(MODEL, "reduced-rank regression", "S00 is singular"))?;
    let s11_isqrt = inverse_sqrt_spd(&s11)
        .ok_or_else(|| AppError::estimation(MODEL, "reduced-rank regression", "S11 is not positive definite"))?;

    let m = &s11_isqrt * s01.transpose() * &s00_inv * &s01 * &s11_isqrt;
    let (eigenvalues, vectors) = sorted_symmetric_eigen(&m);

    let beta_tilde = &s11_isqrt * vectors.columns(0, coint_rank);
    let top_inv = beta_tilde
        .rows(0, coint_rank)
        .into_owned()
        .try_inverse()
        .ok_or_else(|| AppError::estimation(MODEL, "normalizing β", "leading block of β is singular"))?;
    let beta = beta_tilde * top_inv;

    let btsb_inv = (beta.transpose() * &s11 * &beta)
        .try_inverse()
        .ok_or_else(|| AppError::estimation(MODEL, "estimating α", "βᵀ S11 β is singular"))?;
    let alpha = &s01 * &beta * btsb_inv;

    let ec = &alpha * beta.transpose() * &y_lag1;
    let (gamma, resid) = match &dxdx_inv {
        Some(inv) => {
            let gamma = (&dy - &ec) * dx.transpose() * inv;
            let resid = &dy - &ec - &gamma * &dx;
            (gamma, resid)
        }
        None => (DMatrix::zeros(k, 0), &dy - &ec),
    };
    let sigma_u = &resid * resid.transpose() / tf;

    if alpha.iter().chain(beta.iter()).chain(gamma.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::estimation(MODEL, "estimating α, β, Γ", "non-finite coefficients"));
    }

    Ok(VecmResults {
        k_ar_diff,
        coint_rank,
        alpha,
        beta,
        gamma,
        sigma_u,
        resid: resid.transpose(),
        nobs: t,
        eigenvalues: eigenvalues.iter().copied().collect(),
    })
}

impl VecmResults {
    pub fn neqs(&self) -> usize {
        self.alpha.nrows()
    }

    /// Lag order of the levels VAR implied by the model.
    pub fn k_ar(&self) -> usize {
        self.k_ar_diff + 1
    }

    /// `Γ_i` (1-based).
    pub fn gamma_block(&self, i: usize) -> DMatrix<f64> {
        let k = self.neqs();
        self.gamma.columns(k * (i - 1), k).into_owned()
    }

    /// Levels VAR: `A_1 = I + αβᵀ + Γ_1`, `A_i = Γ_i - Γ_{i-1}`, `A_p = -Γ_{p-1}`,
    /// intercept `α β_constᵀ`.
    pub fn representation(&self) -> VarRepresentation {
        let k = self.neqs();
        let p = self.k_ar();
        let pi = &self.alpha * self.beta.rows(0, k).transpose();

        let mut coefs = Vec::with_capacity(p);
        for i in 1..=p {
            let mut a = DMatrix::<f64>::zeros(k, k);
            if i == 1 {
                a += DMatrix::<f64>::identity(k, k) + &pi;
            }
            if i <= self.k_ar_diff {
                a += self.gamma_block(i);
            }
            if i >= 2 {
                a -= self.gamma_block(i - 1);
            }
            coefs.push(a);
        }

        let intercept: DVector<f64> = (&self.alpha * self.beta.row(k).transpose()).column(0).into_owned();

        VarRepresentation {
            intercept,
            coefs,
            sigma_u: self.sigma_u.clone(),
        }
    }
}
