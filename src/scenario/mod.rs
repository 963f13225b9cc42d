//! Scenario paths: statistical forecast first, mean reversion afterwards.
//!
//! Base follows the point forecast, positive the lower bound and negative the
//! upper bound of the inflation column. From month `years_model * 12` on,
//! each path is rewritten by
//!
//! ```text
//! path[t] = path[t-1] + theta * (target - path[t-1])
//! ```
//!
//! where `path[t-1]` is the already rewritten previous month.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domain::{ScenarioKind, ScenarioParams, Variable};
use crate::forecast::ForecastBundle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioPath {
    pub kind: ScenarioKind,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

/// The three paths, always in `ScenarioKind::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    pub paths: Vec<ScenarioPath>,
    /// Index of the first rewritten month; equals the horizon when no
    /// convergence phase runs.
    pub transition: usize,
}

impl ScenarioSet {
    pub fn path(&self, kind: ScenarioKind) -> Option<&ScenarioPath> {
        self.paths.iter().find(|p| p.kind == kind)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.paths.first().map(|p| p.dates.as_slice()).unwrap_or(&[])
    }

    pub fn transition_date(&self) -> Option<NaiveDate> {
        self.dates().get(self.transition).copied()
    }

    pub fn convergence_months(&self) -> usize {
        self.dates().len().saturating_sub(self.transition)
    }
}

/// Overwrite `values[transition..]` with the mean-reverting recursion.
///
/// `seed` is the value preceding `values[transition]`; it is only consulted
/// when `transition == 0`.
pub fn mean_revert(values: &mut [f64], transition: usize, seed: f64, theta: f64, target: f64) {
    if transition >= values.len() {
        return;
    }
    let start = if transition == 0 { seed } else { values[transition - 1] };
    values[transition..].iter_mut().fold(start, |prev, v| {
        *v = prev + theta * (target - prev);
        *v
    });
}

/// Build the three scenario paths from a reconstructed bundle.
///
/// `last_observed` is the last historical inflation value, used to seed the
/// recursion when the model horizon is zero years.
pub fn build_scenarios(bundle: &ForecastBundle, params: &ScenarioParams, last_observed: f64) -> ScenarioSet {
    let horizon = bundle.steps();
    let transition = (params.years_model as usize).saturating_mul(12).min(horizon);

    let paths = ScenarioKind::ALL
        .into_iter()
        .map(|kind| {
            let mut values = match kind {
                ScenarioKind::Base => bundle.point_column(Variable::Inflation),
                ScenarioKind::Positive => bundle.lower_column(Variable::Inflation),
                ScenarioKind::Negative => bundle.upper_column(Variable::Inflation),
            };
            let (theta, target) = params.rule(kind);
            mean_revert(&mut values, transition, last_observed, theta, target);
            ScenarioPath {
                kind,
                dates: bundle.dates.clone(),
                values,
            }
        })
        .collect();

    let set = ScenarioSet { paths, transition };
    info!(
        horizon,
        transition = ?set.transition_date(),
        convergence_months = set.convergence_months(),
        "scenario paths built"
    );
    set
}

/// Descriptive statistics of one path, rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two points.
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

impl ScenarioStats {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std: 0.0,
                max: f64::NAN,
                min: f64::NAN,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            0.0
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            mean: round3(mean),
            std: round3(std),
            max: round3(max),
            min: round3(min),
        }
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Fixed-row comparison table: Base, Positive, Negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub rows: Vec<(ScenarioKind, ScenarioStats)>,
}

impl ScenarioSummary {
    pub fn from_set(set: &ScenarioSet) -> Self {
        let rows = ScenarioKind::ALL
            .into_iter()
            .filter_map(|kind| set.path(kind).map(|p| (kind, ScenarioStats::of(&p.values))))
            .collect();
        Self { rows }
    }

    pub fn get(&self, kind: ScenarioKind) -> Option<&ScenarioStats> {
        self.rows.iter().find(|(k, _)| *k == kind).map(|(_, s)| s)
    }
}
