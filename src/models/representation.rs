//! VAR representation `y_t = c + Σ_{i=1..p} A_i y_{t-i} + u_t` and its forecasts.
//!
//! Forecast error covariance at horizon `h` (1-based) is
//! `Σ_{i<h} Φ_i Σ_u Φ_iᵀ`, with MA coefficients `Φ_0 = I`,
//! `Φ_i = Σ_{j=1..min(i,p)} Φ_{i-j} A_j`. Parameter uncertainty is ignored.

use nalgebra::{DMatrix, DVector};

use crate::math::Z_95;

#[derive(Debug, Clone, PartialEq)]
pub struct VarRepresentation {
    pub intercept: DVector<f64>,
    /// `coefs[i]` multiplies `y_{t-i-1}`.
    pub coefs: Vec<DMatrix<f64>>,
    pub sigma_u: DMatrix<f64>,
}

/// Point forecast and symmetric 95% bounds, each `steps x K`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub point: DMatrix<f64>,
    pub lower: DMatrix<f64>,
    pub upper: DMatrix<f64>,
}

impl VarRepresentation {
    pub fn neqs(&self) -> usize {
        self.intercept.len()
    }

    pub fn lag_order(&self) -> usize {
        self.coefs.len()
    }

    /// `Φ_0 … Φ_{steps-1}`.
    pub fn ma_coefs(&self, steps: usize) -> Vec<DMatrix<f64>> {
        let k = self.neqs();
        let mut phis: Vec<DMatrix<f64>> = Vec::with_capacity(steps);
        for i in 0..steps {
            let phi = if i == 0 {
                DMatrix::identity(k, k)
            } else {
                (1..=i.min(self.lag_order()))
                    .fold(DMatrix::zeros(k, k), |acc, j| acc + &phis[i - j] * &self.coefs[j - 1])
            };
            phis.push(phi);
        }
        phis
    }

    /// Recursive point forecast seeded with the last `p` rows of `history`.
    ///
    /// Returns `None` when `history` is shorter than the lag order or has the
    /// wrong width.
    pub fn forecast(&self, history: &DMatrix<f64>, steps: usize) -> Option<DMatrix<f64>> {
        let k = self.neqs();
        let p = self.lag_order();
        if history.ncols() != k || history.nrows() < p {
            return None;
        }

        // Most recent observation last.
        let mut window: Vec<DVector<f64>> = (history.nrows() - p..history.nrows())
            .map(|r| history.row(r).transpose())
            .collect();

        let mut out = DMatrix::zeros(steps, k);
        for h in 0..steps {
            let next = self
                .coefs
                .iter()
                .enumerate()
                .fold(self.intercept.clone(), |acc, (i, a)| acc + a * &window[window.len() - 1 - i]);
            out.set_row(h, &next.transpose());
            if p > 0 {
                window.remove(0);
                window.push(next);
            }
        }
        Some(out)
    }

    /// Point forecast with 95% bounds `point ± z · sqrt(diag(MSE_h))`.
    pub fn forecast_interval(&self, history: &DMatrix<f64>, steps: usize) -> Option<RawForecast> {
        let point = self.forecast(history, steps)?;
        let k = self.neqs();

        let mut lower = point.clone();
        let mut upper = point.clone();
        let mut mse = DMatrix::<f64>::zeros(k, k);
        for (h, phi) in self.ma_coefs(steps).iter().enumerate() {
            mse += phi * &self.sigma_u * phi.transpose();
            for c in 0..k {
                let half = Z_95 * mse[(c, c)].max(0.0).sqrt();
                if !half.is_finite() {
                    return None;
                }
                lower[(h, c)] -= half;
                upper[(h, c)] += half;
            }
        }

        Some(RawForecast { point, lower, upper })
    }
}
