//! Seeded synthetic aligned series.
//!
//! Used by the `demo` command and by tests that need realistic-looking data
//! without network access. Each regime controls which auxiliary variables
//! carry a stochastic trend.

use chrono::NaiveDate;
use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{AlignedSeries, month_start, month_start_after};
use crate::error::AppError;

/// Which auxiliary variables are integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleRegime {
    /// Policy rate and exchange rate are both stationary AR(1).
    Stationary,
    /// Exchange rate is a drifting random walk; policy rate stays stationary.
    OneTrending,
    /// Exchange rate is a drifting random walk and the policy rate tracks it.
    Cointegrated,
    /// Policy rate and exchange rate are independent driftless random walks.
    IndependentWalks,
}

/// First month of every generated series.
pub const SAMPLE_START: NaiveDate = month_start(2005, 1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub n: usize,
    pub seed: u64,
    pub regime: SampleRegime,
    pub start: NaiveDate,
}

impl SampleSpec {
    pub fn new(n: usize, seed: u64, regime: SampleRegime) -> Self {
        Self {
            n,
            seed,
            regime,
            start: SAMPLE_START,
        }
    }

    pub fn stationary(n: usize, seed: u64) -> Self {
        Self::new(n, seed, SampleRegime::Stationary)
    }

    pub fn one_trending(n: usize, seed: u64) -> Self {
        Self::new(n, seed, SampleRegime::OneTrending)
    }

    pub fn cointegrated(n: usize, seed: u64) -> Self {
        Self::new(n, seed, SampleRegime::Cointegrated)
    }

    pub fn independent_walks(n: usize, seed: u64) -> Self {
        Self::new(n, seed, SampleRegime::IndependentWalks)
    }
}

pub fn generate_aligned(spec: &SampleSpec) -> Result<AlignedSeries, AppError> {
    if spec.n == 0 {
        return Err(AppError::Config("sample size must be > 0".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = |sd: f64| Normal::new(0.0, sd).map_err(|e| AppError::Config(format!("noise distribution error: {e}")));
    let infl_shock = noise(0.20)?;
    let rate_shock = noise(0.15)?;
    let fx_shock = noise(0.012)?;
    let spread_shock = noise(0.03)?;

    let mut rows = Vec::with_capacity(spec.n);
    let mut date = spec.start;
    let (mut infl, mut rate, mut fx, mut spread) = (4.0, 5.0, 2.9, 0.0);

    for i in 0..spec.n {
        let prev_rate = rate;
        match spec.regime {
            SampleRegime::Stationary => {
                rate = 5.0 + 0.5 * (rate - 5.0) + rate_shock.sample(&mut rng);
                fx = 2.9 + 0.5 * (fx - 2.9) + fx_shock.sample(&mut rng);
            }
            SampleRegime::OneTrending => {
                rate = 5.0 + 0.5 * (rate - 5.0) + rate_shock.sample(&mut rng);
                fx += 0.005 + fx_shock.sample(&mut rng);
            }
            SampleRegime::Cointegrated => {
                fx += 0.005 + fx_shock.sample(&mut rng);
                spread = 0.3 * spread + spread_shock.sample(&mut rng);
                rate = 1.0 + 1.5 * fx + spread;
            }
            SampleRegime::IndependentWalks => {
                rate += rate_shock.sample(&mut rng);
                fx += fx_shock.sample(&mut rng);
            }
        }
        infl = 4.0 + 0.8 * (infl - 4.0) + 0.3 * (rate - prev_rate) + infl_shock.sample(&mut rng);

        rows.push((date, [infl, rate, fx]));
        if i + 1 < spec.n {
            date = month_start_after(date, 1)
                .ok_or_else(|| AppError::Config("sample dates overflow the calendar".to_string()))?;
        }
    }

    AlignedSeries::from_rows(&rows)
}

/// Seeded series with a known analysis verdict, for tests elsewhere in the crate.
///
/// A fixed seed can land in the tails of the ADF or Johansen distributions, so
/// each fixture walks forward from its seed to the first series whose verdict
/// matches the regime.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::analysis::{Analysis, analyze};
    use crate::domain::Variable;

    pub fn series_where(spec: SampleSpec, accept: impl Fn(&Analysis) -> bool) -> (AlignedSeries, Analysis) {
        for offset in 0..64 {
            let series = generate_aligned(&SampleSpec {
                seed: spec.seed + offset,
                ..spec
            })
            .unwrap();
            let analysis = analyze(&series).unwrap();
            if accept(&analysis) {
                return (series, analysis);
            }
        }
        panic!("no seed from {} produced the requested verdict", spec.seed);
    }

    pub fn stationary() -> (AlignedSeries, Analysis) {
        series_where(SampleSpec::stationary(200, 21), |a| a.non_stationary().is_empty())
    }

    pub fn one_trending() -> (AlignedSeries, Analysis) {
        series_where(SampleSpec::one_trending(200, 5), |a| {
            a.non_stationary() == vec![Variable::FxLog]
        })
    }

    /// Both auxiliaries non-stationary with exactly one cointegrating relation.
    pub fn cointegrated() -> (AlignedSeries, Analysis) {
        series_where(SampleSpec::cointegrated(200, 42), |a| {
            a.non_stationary().len() == 2 && a.cointegration.rank == 1
        })
    }

    /// Both auxiliaries non-stationary with no cointegrating relation.
    pub fn not_cointegrated() -> (AlignedSeries, Analysis) {
        series_where(SampleSpec::independent_walks(200, 17), |a| {
            a.non_stationary().len() == 2 && a.cointegration.rank == 0
        })
    }
}
