//! Information-criterion lag search for VAR models.

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::models::estimate_var;

/// Largest lag order considered by the search.
pub const MAX_LAGS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct LagSelection {
    /// Lag order with the smallest AIC (first one on ties).
    pub order: usize,
    /// `(lag, aic)` for every evaluated order.
    pub aic: Vec<(usize, f64)>,
}

/// Choose the VAR lag order in `1..=maxlags` minimizing AIC.
///
/// Every candidate is estimated on the same sample (the first `maxlags`
/// rows are reserved as pre-sample) so the criteria are comparable.
pub fn select_lag_order(data: &DMatrix<f64>, maxlags: usize, model: ModelKind) -> Result<LagSelection, AppError> {
    if maxlags == 0 {
        return Err(AppError::estimation(model, "lag order selection", "maxlags must be at least 1"));
    }

    let mut aic = Vec::with_capacity(maxlags);
    for lags in 1..=maxlags {
        let fit = estimate_var(data, lags, maxlags - lags, model)?;
        aic.push((lags, fit.aic));
    }

    let mut order = 1;
    let mut best = f64::INFINITY;
    for &(lags, value) in &aic {
        if value < best {
            best = value;
            order = lags;
        }
    }
    if !best.is_finite() {
        return Err(AppError::estimation(model, "lag order selection", "no finite information criterion"));
    }

    debug!(order, aic = best, "selected lag order");
    Ok(LagSelection { order, aic })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    /// Univariate AR(2) with strong second lag.
    fn ar2(seed: u64, n: usize) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut x = vec![0.0, 0.0];
        for t in 2..n + 50 {
            let next = 0.2 * x[t - 1] + 0.6 * x[t - 2] + normal.sample(&mut rng);
            x.push(next);
        }
        DMatrix::from_iterator(n, 1, x.into_iter().skip(50))
    }

    #[test]
    fn recovers_second_order_dynamics() {
        let data = ar2(3, 400);
        let sel = select_lag_order(&data, 8, ModelKind::VarDifferenced).unwrap();
        assert_eq!(sel.aic.len(), 8);
        assert!(sel.order >= 2, "order {}", sel.order);
        let chosen = sel.aic.iter().find(|(l, _)| *l == sel.order).unwrap().1;
        assert!(sel.aic.iter().all(|(_, v)| *v >= chosen));
    }

    #[test]
    fn too_short_sample_is_an_estimation_error() {
        let data = ar2(1, 20);
        let err = select_lag_order(&data, MAX_LAGS, ModelKind::VarDifferenced).unwrap_err();
        assert!(matches!(err, AppError::Estimation { model: ModelKind::VarDifferenced, .. }));
    }
}
