//! Synthetic series with a known analysis verdict.

#![allow(dead_code)]

use inflation_scenarios::analysis::{Analysis, analyze};
use inflation_scenarios::data::sample::{SampleSpec, generate_aligned};
use inflation_scenarios::domain::{AlignedSeries, Variable};

/// First series from `spec.seed` onwards whose analysis satisfies `accept`.
pub fn series_where(spec: SampleSpec, accept: impl Fn(&Analysis) -> bool) -> AlignedSeries {
    for offset in 0..64 {
        let series = generate_aligned(&SampleSpec {
            seed: spec.seed + offset,
            ..spec
        })
        .unwrap();
        if accept(&analyze(&series).unwrap()) {
            return series;
        }
    }
    panic!("no seed from {} produced the requested verdict", spec.seed);
}

pub fn stationary(n: usize, seed: u64) -> AlignedSeries {
    series_where(SampleSpec::stationary(n, seed), |a| a.non_stationary().is_empty())
}

pub fn one_trending(n: usize, seed: u64) -> AlignedSeries {
    series_where(SampleSpec::one_trending(n, seed), |a| a.non_stationary() == vec![Variable::FxLog])
}

pub fn cointegrated(n: usize, seed: u64) -> AlignedSeries {
    series_where(SampleSpec::cointegrated(n, seed), |a| {
        a.non_stationary().len() == 2 && a.cointegration.rank == 1
    })
}

pub fn not_cointegrated(n: usize, seed: u64) -> AlignedSeries {
    series_where(SampleSpec::independent_walks(n, seed), |a| {
        a.non_stationary().len() == 2 && a.cointegration.rank == 0
    })
}
